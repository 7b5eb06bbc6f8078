//! HTTP API handlers

mod health;
mod history;
mod notes;

pub use health::{health_check, health_routes};
pub use history::{create_history, list_history};
pub use notes::{create_note, delete_note, list_notes};

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use vibesync_common::Error;

/// Error type returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    NotFound(String),
    Database(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            // Constraint violations (duplicate ids) are caller errors
            Error::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                ApiError::InvalidInput(db.to_string())
            }
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
