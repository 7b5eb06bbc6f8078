//! Persistence client
//!
//! CRUD calls against the store service for history entries and notes.
//! Failures are terminal for the triggering action; there are no retries.

use std::time::Duration;
use thiserror::Error;
use vibesync_common::{AudioAnalysis, Note};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Persistence client errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Store error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// HTTP client for the store service
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// `base_url` is the store root, e.g. `http://127.0.0.1:3005`
    pub fn new(base_url: String) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// GET /api/history, newest first
    pub async fn fetch_history(&self) -> Result<Vec<AudioAnalysis>, BackendError> {
        let response = self
            .http_client
            .get(format!("{}/api/history", self.base_url))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// POST /api/history
    pub async fn save_analysis(&self, analysis: &AudioAnalysis) -> Result<(), BackendError> {
        let response = self
            .http_client
            .post(format!("{}/api/history", self.base_url))
            .json(analysis)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    /// GET /api/notes, newest first
    pub async fn fetch_notes(&self) -> Result<Vec<Note>, BackendError> {
        let response = self
            .http_client
            .get(format!("{}/api/notes", self.base_url))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// POST /api/notes
    pub async fn save_note(&self, note: &Note) -> Result<(), BackendError> {
        let response = self
            .http_client
            .post(format!("{}/api/notes", self.base_url))
            .json(note)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    /// DELETE /api/notes/{id}
    pub async fn delete_note(&self, id: &str) -> Result<(), BackendError> {
        let response = self
            .http_client
            .delete(format!("{}/api/notes/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api(status.as_u16(), body))
}
