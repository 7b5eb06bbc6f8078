//! # VibeSync Common Library
//!
//! Shared code for the VibeSync services including:
//! - Domain models (analyses, recommendations, notes, chat)
//! - Database initialization and queries
//! - Configuration loading
//! - UI translations (English/Spanish)

pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod model;

pub use error::{Error, Result};
pub use model::{AnalysisReport, AppView, AudioAnalysis, ChatMessage, ChatRole, Language, Note, Recommendation};
