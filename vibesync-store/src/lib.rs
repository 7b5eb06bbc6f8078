//! vibesync-store library - persistence REST service
//!
//! CRUD surface over the single-file SQLite store: analysis history and
//! session notes. The UI talks to this service over localhost HTTP.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get};

    Router::new()
        .route("/api/history", get(api::list_history).post(api::create_history))
        .route("/api/notes", get(api::list_notes).post(api::create_note))
        .route("/api/notes/:id", delete(api::delete_note))
        .merge(api::health_routes())
        // The UI may be served from a different origin during development
        .layer(CorsLayer::permissive())
        .with_state(state)
}
