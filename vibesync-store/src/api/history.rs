//! History endpoints
//!
//! One analysis per row; the serialized record lives in the `data` column
//! with duplicated mood/genre/tempo columns for ad-hoc inspection.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;
use vibesync_common::{db, AudioAnalysis};

use super::ApiError;
use crate::AppState;

/// GET /api/history
///
/// Returns all analyses, newest first.
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<AudioAnalysis>>, ApiError> {
    let history = db::list_history(&state.db).await?;
    Ok(Json(history))
}

/// POST /api/history
///
/// Persists one analysis. Duplicate identifiers are a caller error (400).
pub async fn create_history(
    State(state): State<AppState>,
    Json(analysis): Json<AudioAnalysis>,
) -> Result<Json<Value>, ApiError> {
    if analysis.id.is_empty() {
        return Err(ApiError::InvalidInput("analysis id must not be empty".to_string()));
    }

    db::insert_analysis(&state.db, &analysis).await?;
    info!(id = %analysis.id, genre = %analysis.detected_genre, "Stored analysis");

    Ok(Json(json!({ "message": "success", "id": analysis.id })))
}
