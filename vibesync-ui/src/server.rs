//! HTTP server for the UI process
//!
//! Serves the rendered views, the JSON state snapshot, the control
//! endpoints driving the controller, and the SSE event stream.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use vibesync_common::AppView;

use crate::controller::{Controller, ControllerError};
use crate::views;

pub type AppContext = Arc<Controller>;

/// Build the UI router
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health_check))
        .route("/api/state", get(get_state))
        .route("/api/recording/start", post(start_recording))
        .route("/api/recording/stop", post(stop_recording))
        .route("/api/notes", post(create_note))
        .route("/api/notes/:id", delete(delete_note))
        .route("/api/recommendations/:index/note", post(note_from_recommendation))
        .route("/api/chat", post(send_chat))
        .route("/api/language/toggle", post(toggle_language))
        .route("/api/view", post(set_view))
        .route("/api/history/select", post(select_history))
        .route("/api/events", get(event_stream))
        .with_state(ctx)
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ControllerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ControllerError::NotFound(_) => StatusCode::NOT_FOUND,
            ControllerError::NotRecording => StatusCode::CONFLICT,
            ControllerError::Capture(_) => StatusCode::SERVICE_UNAVAILABLE,
            ControllerError::Analysis(_) | ControllerError::Persistence(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// GET / - active view rendered as HTML
async fn serve_index(State(ctx): State<AppContext>) -> Html<String> {
    let snapshot = ctx.state().snapshot().await;
    Html(views::render_page(&snapshot))
}

/// GET /health
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "vibesync-ui",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/state - full state snapshot
async fn get_state(State(ctx): State<AppContext>) -> Response {
    let snapshot = ctx.state().snapshot().await;
    Json(snapshot).into_response()
}

/// POST /api/recording/start
async fn start_recording(State(ctx): State<AppContext>) -> Result<Response, ControllerError> {
    ctx.start_recording().await?;
    Ok(Json(json!({ "recording": true })).into_response())
}

/// POST /api/recording/stop - stop and run the analysis pipeline
async fn stop_recording(State(ctx): State<AppContext>) -> Result<Response, ControllerError> {
    let analysis = ctx.stop_and_analyze().await?;
    Ok(Json(analysis).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteRequest {
    content: String,
    #[serde(default)]
    related_analysis_id: Option<String>,
}

/// POST /api/notes
async fn create_note(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<Response, ControllerError> {
    let note = ctx.add_note(req.content, req.related_analysis_id).await?;
    Ok((StatusCode::CREATED, Json(note)).into_response())
}

/// DELETE /api/notes/:id
async fn delete_note(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, ControllerError> {
    ctx.delete_note(&id).await?;
    Ok(Json(json!({ "message": "deleted" })).into_response())
}

/// POST /api/recommendations/:index/note - note templated from a vibe match
async fn note_from_recommendation(
    State(ctx): State<AppContext>,
    Path(index): Path<usize>,
) -> Result<Response, ControllerError> {
    let note = ctx.add_note_for_recommendation(index).await?;
    Ok((StatusCode::CREATED, Json(note)).into_response())
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// POST /api/chat
async fn send_chat(
    State(ctx): State<AppContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ControllerError> {
    let reply = ctx.send_chat_message(req.message).await?;
    Ok(Json(json!({ "reply": reply })).into_response())
}

/// POST /api/language/toggle
async fn toggle_language(State(ctx): State<AppContext>) -> Response {
    let language = ctx.toggle_language().await;
    Json(json!({ "language": language })).into_response()
}

#[derive(Debug, Deserialize)]
struct SetViewRequest {
    view: AppView,
}

/// POST /api/view
async fn set_view(State(ctx): State<AppContext>, Json(req): Json<SetViewRequest>) -> Response {
    ctx.set_view(req.view).await;
    Json(json!({ "view": req.view })).into_response()
}

#[derive(Debug, Deserialize)]
struct SelectHistoryRequest {
    id: String,
}

/// POST /api/history/select - bring a past analysis into the Analyzer view
async fn select_history(
    State(ctx): State<AppContext>,
    Json(req): Json<SelectHistoryRequest>,
) -> Result<Response, ControllerError> {
    ctx.select_history_entry(&req.id).await?;
    Ok(Json(json!({ "selected": req.id })).into_response())
}

/// GET /api/events - SSE event stream
async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");
    let rx = ctx.state().subscribe_events();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.event_type()).data(json))),
                Err(e) => {
                    warn!("Failed to serialize event: {e}");
                    None
                }
            },
            Err(e) => {
                // Lagged or closed receiver
                warn!("SSE stream error: {e:?}");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
