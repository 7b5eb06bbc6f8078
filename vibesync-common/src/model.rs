//! Domain models
//!
//! Plain data types shared by the store service and the UI. The serde
//! names match the wire format of the persistence API (camelCase), so the
//! same types serialize to the `data` blob, the REST bodies, and the AI
//! response schema.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// UI language preference (session state, not persisted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Language {
    /// Two-letter code as used on the wire ("en"/"es")
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// The other language (the selector is two-valued)
    pub fn toggled(&self) -> Language {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }
}

/// Active application view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppView {
    Analyzer,
    Dashboard,
    History,
    Notes,
}

/// One recommended track, owned by its parent [`AudioAnalysis`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub artist: String,
    pub title: String,
    /// Natural-language reason the track matches
    pub reason: String,
    /// Similarity to the analyzed clip, 0-100
    pub similarity_score: f64,
}

/// Classification result from the AI collaborator, before the client
/// assigns an identity. Field names mirror the response schema sent to
/// the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub detected_genre: String,
    pub mood: String,
    pub tempo: String,
    /// Salient sonic descriptors, e.g. "Syncopated bass", "Vinyl crackle"
    pub key_elements: Vec<String>,
    pub vibe_description: String,
    pub recommendations: Vec<Recommendation>,
}

/// One completed analysis. Immutable once created; `id` and `timestamp`
/// are set by the client at creation time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysis {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub detected_genre: String,
    pub mood: String,
    pub tempo: String,
    pub key_elements: Vec<String>,
    pub vibe_description: String,
    pub recommendations: Vec<Recommendation>,
}

impl AudioAnalysis {
    /// Promote a report to a history entry with a fresh identity
    pub fn from_report(report: AnalysisReport) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            detected_genre: report.detected_genre,
            mood: report.mood,
            tempo: report.tempo,
            key_elements: report.key_elements,
            vibe_description: report.vibe_description,
            recommendations: report.recommendations,
        }
    }
}

/// Free-text session note with an optional weak reference to an analysis.
///
/// The reference is an identifier lookup against the current history
/// collection, never an object link: the referenced analysis may be absent
/// and resolution simply fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_analysis_id: Option<String>,
}

impl Note {
    /// Create a note with a fresh identity
    pub fn new(content: String, related_analysis_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            content,
            related_analysis_id,
        }
    }
}

/// Chat transcript roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry. Transient, held only for the running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
