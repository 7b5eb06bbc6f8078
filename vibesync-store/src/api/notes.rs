//! Notes endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use vibesync_common::{db, Note};

use super::ApiError;
use crate::AppState;

/// GET /api/notes
///
/// Returns all notes, newest first.
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = db::list_notes(&state.db).await?;
    Ok(Json(notes))
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    Json(note): Json<Note>,
) -> Result<Json<Value>, ApiError> {
    if note.id.is_empty() {
        return Err(ApiError::InvalidInput("note id must not be empty".to_string()));
    }

    db::insert_note(&state.db, &note).await?;
    info!(id = %note.id, "Stored note");

    Ok(Json(json!({ "message": "success", "id": note.id })))
}

/// DELETE /api/notes/:id
///
/// Removes exactly the identified note. Deleting an unknown id is a 404.
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let changes = db::delete_note(&state.db, &id).await?;
    if changes == 0 {
        return Err(ApiError::NotFound(format!("note {id} not found")));
    }

    info!(id = %id, "Deleted note");
    Ok(Json(json!({ "message": "deleted", "changes": changes })))
}
