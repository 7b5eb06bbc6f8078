//! View/state controller
//!
//! Owns the explicit application state container and the orchestration
//! between capture, visualizer, AI clients, and the persistence client.
//! State is mutated only here, in response to completed async operations
//! or user input; views receive read-only snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{info, warn};
use vibesync_common::i18n::Translations;
use vibesync_common::{AnalysisReport, AppView, AudioAnalysis, ChatMessage, Language, Note};

use crate::backend::{BackendClient, BackendError};
use crate::capture::{ActiveRecording, CaptureError, Recorder};
use crate::events::UiEvent;
use crate::gemini::{GeminiClient, GeminiError};
use crate::visualizer::{FrameScheduler, Visualizer};

/// Controller operation errors
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] GeminiError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] BackendError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No recording in progress")]
    NotRecording,
}

/// AI collaborator seam (implemented by [`GeminiClient`])
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze_audio(
        &self,
        base64_wav: &str,
        language: Language,
    ) -> Result<AnalysisReport, GeminiError>;

    async fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
        language: Language,
    ) -> Result<String, GeminiError>;
}

#[async_trait]
impl AnalysisService for GeminiClient {
    async fn analyze_audio(
        &self,
        base64_wav: &str,
        language: Language,
    ) -> Result<AnalysisReport, GeminiError> {
        GeminiClient::analyze_audio(self, base64_wav, language).await
    }

    async fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
        language: Language,
    ) -> Result<String, GeminiError> {
        GeminiClient::chat(self, history, message, language).await
    }
}

/// Persistence collaborator seam (implemented by [`BackendClient`])
#[async_trait]
pub trait PersistenceService: Send + Sync {
    async fn fetch_history(&self) -> Result<Vec<AudioAnalysis>, BackendError>;
    async fn save_analysis(&self, analysis: &AudioAnalysis) -> Result<(), BackendError>;
    async fn fetch_notes(&self) -> Result<Vec<Note>, BackendError>;
    async fn save_note(&self, note: &Note) -> Result<(), BackendError>;
    async fn delete_note(&self, id: &str) -> Result<(), BackendError>;
}

#[async_trait]
impl PersistenceService for BackendClient {
    async fn fetch_history(&self) -> Result<Vec<AudioAnalysis>, BackendError> {
        BackendClient::fetch_history(self).await
    }
    async fn save_analysis(&self, analysis: &AudioAnalysis) -> Result<(), BackendError> {
        BackendClient::save_analysis(self, analysis).await
    }
    async fn fetch_notes(&self) -> Result<Vec<Note>, BackendError> {
        BackendClient::fetch_notes(self).await
    }
    async fn save_note(&self, note: &Note) -> Result<(), BackendError> {
        BackendClient::save_note(self, note).await
    }
    async fn delete_note(&self, id: &str) -> Result<(), BackendError> {
        BackendClient::delete_note(self, id).await
    }
}

/// Read-only view of the full application state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub active_view: AppView,
    pub language: Language,
    pub is_recording: bool,
    pub is_analyzing: bool,
    pub current_analysis: Option<AudioAnalysis>,
    pub history: Vec<AudioAnalysis>,
    pub notes: Vec<Note>,
    pub chat: Vec<ChatMessage>,
}

/// Shared application state.
///
/// The recording flag is an atomic shared with the visualizer's frame
/// loop; everything else sits behind RwLocks for concurrent reads with
/// rare writes.
pub struct SharedState {
    pub active_view: RwLock<AppView>,
    pub language: RwLock<Language>,
    pub recording: Arc<AtomicBool>,
    pub analyzing: AtomicBool,
    pub current_analysis: RwLock<Option<AudioAnalysis>>,
    pub history: RwLock<Vec<AudioAnalysis>>,
    pub notes: RwLock<Vec<Note>>,
    pub chat: RwLock<Vec<ChatMessage>>,
    event_tx: broadcast::Sender<UiEvent>,
}

impl SharedState {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            active_view: RwLock::new(AppView::Analyzer),
            // Spanish by default, as shipped
            language: RwLock::new(Language::Es),
            recording: Arc::new(AtomicBool::new(false)),
            analyzing: AtomicBool::new(false),
            current_analysis: RwLock::new(None),
            history: RwLock::new(Vec::new()),
            notes: RwLock::new(Vec::new()),
            chat: RwLock::new(Vec::new()),
            event_tx,
        }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: UiEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<UiEvent> {
        self.event_tx.subscribe()
    }

    /// Sender half of the event channel (visualizer surface wiring)
    pub fn event_sender(&self) -> broadcast::Sender<UiEvent> {
        self.event_tx.clone()
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            active_view: *self.active_view.read().await,
            language: *self.language.read().await,
            is_recording: self.recording.load(Ordering::SeqCst),
            is_analyzing: self.analyzing.load(Ordering::SeqCst),
            current_analysis: self.current_analysis.read().await.clone(),
            history: self.history.read().await.clone(),
            notes: self.notes.read().await.clone(),
            chat: self.chat.read().await.clone(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for the per-animation frame scheduler
pub type SchedulerFactory = Box<dyn Fn() -> Box<dyn FrameScheduler> + Send + Sync>;

/// Top-level application controller
pub struct Controller {
    state: Arc<SharedState>,
    recorder: Box<dyn Recorder>,
    analysis: Arc<dyn AnalysisService>,
    store: Arc<dyn PersistenceService>,
    visualizer: Mutex<Visualizer>,
    session: Mutex<Option<Box<dyn ActiveRecording>>>,
    scheduler_factory: SchedulerFactory,
}

impl Controller {
    pub fn new(
        state: Arc<SharedState>,
        recorder: Box<dyn Recorder>,
        analysis: Arc<dyn AnalysisService>,
        store: Arc<dyn PersistenceService>,
        visualizer: Visualizer,
        scheduler_factory: SchedulerFactory,
    ) -> Self {
        Self {
            state,
            recorder,
            analysis,
            store,
            visualizer: Mutex::new(visualizer),
            session: Mutex::new(None),
            scheduler_factory,
        }
    }

    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    async fn translations(&self) -> &'static Translations {
        Translations::get(*self.state.language.read().await)
    }

    /// Fetch persisted history and notes, and seed the chat greeting.
    ///
    /// Each fetch is individually fault tolerant; a store outage leaves
    /// the corresponding list empty.
    pub async fn load_initial_state(&self) {
        match self.store.fetch_history().await {
            Ok(history) => *self.state.history.write().await = history,
            Err(e) => warn!("Failed to load history: {e}"),
        }
        match self.store.fetch_notes().await {
            Ok(notes) => *self.state.notes.write().await = notes,
            Err(e) => warn!("Failed to load notes: {e}"),
        }

        let t = self.translations().await;
        let mut chat = self.state.chat.write().await;
        if chat.is_empty() {
            chat.push(ChatMessage::assistant(t.chat_intro));
        }
        drop(chat);

        self.state.broadcast_event(UiEvent::StateChanged);
    }

    /// Start a recording session.
    ///
    /// Binds the analyser and visualizer to the new live stream and sets
    /// the recording flag. Microphone failure is surfaced to the user and
    /// recording never starts.
    pub async fn start_recording(&self) -> Result<(), ControllerError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return Ok(());
        }

        let active = match self.recorder.start() {
            Ok(active) => active,
            Err(e) => {
                let t = self.translations().await;
                self.state.broadcast_event(UiEvent::UserError {
                    message: t.error_mic_denied.to_string(),
                });
                return Err(e.into());
            }
        };

        let live = active.live_stream();
        let mut visualizer = self.visualizer.lock().await;
        visualizer.bind(&live).await;

        self.state.recording.store(true, Ordering::SeqCst);
        visualizer.start_animation(
            (self.scheduler_factory)(),
            Arc::clone(&self.state.recording),
        );
        drop(visualizer);

        *session = Some(active);
        info!("Recording started");
        self.state.broadcast_event(UiEvent::RecordingStarted);
        self.state.broadcast_event(UiEvent::StateChanged);
        Ok(())
    }

    /// Stop the recording session and run the analysis pipeline.
    ///
    /// Hard sequential boundary: the clip is assembled and the device
    /// released before the remote call is issued; there is no mid-flight
    /// cancellation of the analysis itself. On success the new analysis is
    /// persisted, prepended to history, and made current.
    pub async fn stop_and_analyze(&self) -> Result<AudioAnalysis, ControllerError> {
        let active = {
            let mut session = self.session.lock().await;
            session.take().ok_or(ControllerError::NotRecording)?
        };

        // Flag first: the frame loop notices and clears within one frame
        self.state.recording.store(false, Ordering::SeqCst);
        {
            let mut visualizer = self.visualizer.lock().await;
            visualizer.stop_animation().await;
            visualizer.teardown().await;
        }

        // Flush, assemble, release. stop() joins the capture thread.
        let clip = tokio::task::spawn_blocking(move || active.stop())
            .await
            .map_err(|e| CaptureError::Stream(e.to_string()))??;
        info!(samples = clip.sample_count, "Recording stopped");
        self.state.broadcast_event(UiEvent::RecordingStopped);

        self.state.analyzing.store(true, Ordering::SeqCst);
        self.state.broadcast_event(UiEvent::StateChanged);

        let base64_audio = base64::engine::general_purpose::STANDARD.encode(&clip.wav_bytes);
        let language = *self.state.language.read().await;

        let report = match self.analysis.analyze_audio(&base64_audio, language).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Analysis failed: {e}");
                self.state.analyzing.store(false, Ordering::SeqCst);
                let t = self.translations().await;
                self.state.broadcast_event(UiEvent::UserError {
                    message: t.error_analysis_failed.to_string(),
                });
                self.state.broadcast_event(UiEvent::StateChanged);
                return Err(e.into());
            }
        };

        let analysis = AudioAnalysis::from_report(report);

        // History reflects the store: prepend only once the save resolved
        match self.store.save_analysis(&analysis).await {
            Ok(()) => self.state.history.write().await.insert(0, analysis.clone()),
            Err(e) => warn!("Failed to save analysis: {e}"),
        }

        *self.state.current_analysis.write().await = Some(analysis.clone());
        *self.state.active_view.write().await = AppView::Analyzer;
        self.state.analyzing.store(false, Ordering::SeqCst);

        self.state.broadcast_event(UiEvent::AnalysisComplete {
            id: analysis.id.clone(),
        });
        self.state.broadcast_event(UiEvent::StateChanged);
        Ok(analysis)
    }

    /// Create a note, optionally weakly referencing an analysis
    pub async fn add_note(
        &self,
        content: String,
        related_analysis_id: Option<String>,
    ) -> Result<Note, ControllerError> {
        if content.trim().is_empty() {
            return Err(ControllerError::InvalidInput(
                "note content must not be empty".to_string(),
            ));
        }

        let note = Note::new(content, related_analysis_id);
        self.store.save_note(&note).await?;
        self.state.notes.write().await.insert(0, note.clone());
        self.state.broadcast_event(UiEvent::StateChanged);
        Ok(note)
    }

    /// Create a note for one of the current analysis' recommendations
    pub async fn add_note_for_recommendation(
        &self,
        index: usize,
    ) -> Result<Note, ControllerError> {
        let (content, analysis_id) = {
            let current = self.state.current_analysis.read().await;
            let analysis = current
                .as_ref()
                .ok_or_else(|| ControllerError::NotFound("no current analysis".to_string()))?;
            let rec = analysis.recommendations.get(index).ok_or_else(|| {
                ControllerError::NotFound(format!("recommendation {index} not found"))
            })?;
            (
                format!(
                    "Must check out {} by {}. Vibe: {}",
                    rec.title, rec.artist, rec.reason
                ),
                analysis.id.clone(),
            )
        };
        self.add_note(content, Some(analysis_id)).await
    }

    /// Delete a note by identifier
    pub async fn delete_note(&self, id: &str) -> Result<(), ControllerError> {
        self.store.delete_note(id).await?;
        self.state.notes.write().await.retain(|n| n.id != id);
        self.state.broadcast_event(UiEvent::StateChanged);
        Ok(())
    }

    /// Send a chat message and append the assistant's reply.
    ///
    /// A failed remote call appends the localized error message instead;
    /// prior transcript entries are never touched.
    pub async fn send_chat_message(&self, message: String) -> Result<String, ControllerError> {
        let message = message.trim().to_string();
        if message.is_empty() {
            return Err(ControllerError::InvalidInput(
                "chat message must not be empty".to_string(),
            ));
        }

        let language = *self.state.language.read().await;
        let history = {
            let mut chat = self.state.chat.write().await;
            let history = chat.clone();
            chat.push(ChatMessage::user(message.clone()));
            history
        };
        self.state.broadcast_event(UiEvent::StateChanged);

        let reply = match self.analysis.chat(&history, &message, language).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat failed: {e}");
                Translations::get(language).chat_error.to_string()
            }
        };

        self.state.chat.write().await.push(ChatMessage::assistant(reply.clone()));
        self.state.broadcast_event(UiEvent::StateChanged);
        Ok(reply)
    }

    /// Toggle the UI language.
    ///
    /// If the transcript still holds at most the initial greeting, it is
    /// re-seeded with the new language's greeting; a transcript with user
    /// messages is left untouched.
    pub async fn toggle_language(&self) -> Language {
        let new_language = {
            let mut language = self.state.language.write().await;
            *language = language.toggled();
            *language
        };

        let t = Translations::get(new_language);
        let mut chat = self.state.chat.write().await;
        if chat.len() <= 1 {
            *chat = vec![ChatMessage::assistant(t.chat_intro)];
        }
        drop(chat);

        self.state.broadcast_event(UiEvent::StateChanged);
        new_language
    }

    /// Switch the active view
    pub async fn set_view(&self, view: AppView) {
        *self.state.active_view.write().await = view;
        self.state.broadcast_event(UiEvent::ViewChanged { view });
        self.state.broadcast_event(UiEvent::StateChanged);
    }

    /// Bring a past analysis back into the Analyzer view.
    ///
    /// Selection displays the stored entry; it never mutates it.
    pub async fn select_history_entry(&self, id: &str) -> Result<(), ControllerError> {
        let analysis = {
            let history = self.state.history.read().await;
            history
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .ok_or_else(|| ControllerError::NotFound(format!("analysis {id} not found")))?
        };

        *self.state.current_analysis.write().await = Some(analysis);
        *self.state.active_view.write().await = AppView::Analyzer;
        self.state.broadcast_event(UiEvent::StateChanged);
        Ok(())
    }
}
