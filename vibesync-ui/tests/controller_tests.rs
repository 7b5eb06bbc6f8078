//! End-to-end controller tests with instrumented collaborator doubles

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;
use vibesync_common::i18n::Translations;
use vibesync_common::{
    AnalysisReport, AppView, AudioAnalysis, ChatMessage, ChatRole, Language, Note, Recommendation,
};
use vibesync_ui::backend::BackendError;
use vibesync_ui::capture::{
    ActiveRecording, CaptureError, LiveStream, RecordedClip, Recorder,
};
use vibesync_ui::controller::{
    AnalysisService, Controller, ControllerError, PersistenceService, SharedState,
};
use vibesync_ui::events::UiEvent;
use vibesync_ui::gemini::{GeminiClient, GeminiError};
use vibesync_ui::visualizer::{FrameScheduler, IntervalScheduler, Visualizer};

fn lofi_report() -> AnalysisReport {
    AnalysisReport {
        detected_genre: "Lo-fi Hip Hop".to_string(),
        mood: "Chill".to_string(),
        tempo: "85 BPM".to_string(),
        key_elements: vec!["Vinyl crackle".to_string(), "Mellow keys".to_string()],
        vibe_description: "Late night study session energy.".to_string(),
        recommendations: vec![Recommendation {
            artist: "Nujabes".to_string(),
            title: "Feather".to_string(),
            reason: "Same warm boom-bap swing.".to_string(),
            similarity_score: 93.0,
        }],
    }
}

/// Scripted AI collaborator
struct StubAnalysis {
    report: Option<AnalysisReport>,
    chat_reply: Option<String>,
}

impl StubAnalysis {
    fn ok() -> Self {
        Self {
            report: Some(lofi_report()),
            chat_reply: Some("Try some jazzy breaks next.".to_string()),
        }
    }

    fn failing() -> Self {
        Self {
            report: None,
            chat_reply: None,
        }
    }
}

#[async_trait]
impl AnalysisService for StubAnalysis {
    async fn analyze_audio(
        &self,
        _base64_wav: &str,
        _language: Language,
    ) -> Result<AnalysisReport, GeminiError> {
        self.report
            .clone()
            .ok_or_else(|| GeminiError::Network("connection refused".to_string()))
    }

    async fn chat(
        &self,
        _history: &[ChatMessage],
        _message: &str,
        _language: Language,
    ) -> Result<String, GeminiError> {
        self.chat_reply
            .clone()
            .ok_or_else(|| GeminiError::Network("connection refused".to_string()))
    }
}

/// In-memory stand-in for the persistence service
#[derive(Default)]
struct MemoryStore {
    analyses: Mutex<Vec<AudioAnalysis>>,
    notes: Mutex<Vec<Note>>,
    fail_saves: AtomicBool,
    fail_deletes: AtomicBool,
}

#[async_trait]
impl PersistenceService for MemoryStore {
    async fn fetch_history(&self) -> Result<Vec<AudioAnalysis>, BackendError> {
        Ok(self.analyses.lock().unwrap().clone())
    }

    async fn save_analysis(&self, analysis: &AudioAnalysis) -> Result<(), BackendError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BackendError::Network("store offline".to_string()));
        }
        self.analyses.lock().unwrap().insert(0, analysis.clone());
        Ok(())
    }

    async fn fetch_notes(&self) -> Result<Vec<Note>, BackendError> {
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn save_note(&self, note: &Note) -> Result<(), BackendError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BackendError::Network("store offline".to_string()));
        }
        self.notes.lock().unwrap().insert(0, note.clone());
        Ok(())
    }

    async fn delete_note(&self, id: &str) -> Result<(), BackendError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BackendError::Network("store offline".to_string()));
        }
        self.notes.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }
}

/// Recorder counting every device release
struct CountingRecorder {
    stops: Arc<AtomicUsize>,
}

struct CountingSession {
    stream: LiveStream,
    stops: Arc<AtomicUsize>,
}

impl Recorder for CountingRecorder {
    fn start(&self) -> Result<Box<dyn ActiveRecording>, CaptureError> {
        let (feed, _) = broadcast::channel(8);
        Ok(Box::new(CountingSession {
            stream: LiveStream::new(48_000, feed),
            stops: Arc::clone(&self.stops),
        }))
    }
}

impl ActiveRecording for CountingSession {
    fn live_stream(&self) -> LiveStream {
        self.stream.clone()
    }

    fn stop(self: Box<Self>) -> Result<RecordedClip, CaptureError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(RecordedClip {
            wav_bytes: vec![0x52, 0x49, 0x46, 0x46],
            sample_rate: 48_000,
            sample_count: 4,
        })
    }
}

/// Recorder whose device is never granted
struct DeniedRecorder;

impl Recorder for DeniedRecorder {
    fn start(&self) -> Result<Box<dyn ActiveRecording>, CaptureError> {
        Err(CaptureError::DeviceUnavailable)
    }
}

fn scheduler_factory() -> Box<dyn Fn() -> Box<dyn FrameScheduler> + Send + Sync> {
    Box::new(|| Box::new(IntervalScheduler::new(60)) as Box<dyn FrameScheduler>)
}

fn build_controller(
    recorder: Box<dyn Recorder>,
    analysis: Arc<dyn AnalysisService>,
    store: Arc<dyn PersistenceService>,
) -> Controller {
    Controller::new(
        Arc::new(SharedState::new()),
        recorder,
        analysis,
        store,
        Visualizer::new(None),
        scheduler_factory(),
    )
}

fn counting_controller(
    analysis: Arc<dyn AnalysisService>,
    store: Arc<MemoryStore>,
) -> (Controller, Arc<AtomicUsize>) {
    let stops = Arc::new(AtomicUsize::new(0));
    let controller = build_controller(
        Box::new(CountingRecorder {
            stops: Arc::clone(&stops),
        }),
        analysis,
        store,
    );
    (controller, stops)
}

#[tokio::test]
async fn successful_analysis_lands_at_the_top_of_history() {
    let store = Arc::new(MemoryStore::default());
    let (controller, stops) =
        counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    let state = controller.state();

    controller.start_recording().await.unwrap();
    assert!(state.recording.load(Ordering::SeqCst));

    let analysis = controller.stop_and_analyze().await.unwrap();
    assert_eq!(analysis.detected_genre, "Lo-fi Hip Hop");
    assert!(!analysis.id.is_empty());
    assert!(analysis.timestamp > 0);

    // Exactly one device release
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert!(!state.recording.load(Ordering::SeqCst));

    // Persisted, prepended, and made current
    assert_eq!(store.analyses.lock().unwrap().len(), 1);
    let history = state.history.read().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, analysis.id);
    drop(history);
    assert_eq!(
        state.current_analysis.read().await.as_ref().map(|a| a.id.clone()),
        Some(analysis.id)
    );
    assert_eq!(*state.active_view.read().await, AppView::Analyzer);
    assert!(!state.analyzing.load(Ordering::SeqCst));
}

#[tokio::test]
async fn stopping_twice_is_impossible() {
    let store = Arc::new(MemoryStore::default());
    let (controller, stops) =
        counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));

    controller.start_recording().await.unwrap();
    controller.stop_and_analyze().await.unwrap();

    let second = controller.stop_and_analyze().await;
    assert!(matches!(second, Err(ControllerError::NotRecording)));
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn keyless_client_persists_the_placeholder_like_any_result() {
    let store = Arc::new(MemoryStore::default());
    let gemini = GeminiClient::new(None).unwrap();
    let (controller, _) = counting_controller(Arc::new(gemini), Arc::clone(&store));

    controller.start_recording().await.unwrap();
    let analysis = controller.stop_and_analyze().await.unwrap();

    assert_eq!(analysis.detected_genre, "Unknown (No API Key)");
    assert_eq!(analysis.tempo, "0 BPM");
    assert!(analysis.recommendations.is_empty());

    // The placeholder is a valid entry, stored and listed
    assert_eq!(store.analyses.lock().unwrap().len(), 1);
    let state = controller.state();
    let history = state.history.read().await;
    assert_eq!(history[0].detected_genre, "Unknown (No API Key)");
}

#[tokio::test]
async fn mic_denial_stops_the_action_before_it_starts() {
    let store = Arc::new(MemoryStore::default());
    let controller = build_controller(
        Box::new(DeniedRecorder),
        Arc::new(StubAnalysis::ok()),
        store,
    );
    let state = controller.state();
    let mut events = state.subscribe_events();

    let result = controller.start_recording().await;
    assert!(matches!(result, Err(ControllerError::Capture(_))));
    assert!(!state.recording.load(Ordering::SeqCst));

    // Localized for the default (Spanish) session
    let expected = Translations::get(Language::Es).error_mic_denied;
    loop {
        match events.recv().await.unwrap() {
            UiEvent::UserError { message } => {
                assert_eq!(message, expected);
                break;
            }
            _ => continue,
        }
    }
}

#[tokio::test]
async fn failed_analysis_stores_nothing_and_notifies() {
    let store = Arc::new(MemoryStore::default());
    let (controller, stops) =
        counting_controller(Arc::new(StubAnalysis::failing()), Arc::clone(&store));
    let state = controller.state();
    let mut events = state.subscribe_events();

    controller.start_recording().await.unwrap();
    let result = controller.stop_and_analyze().await;
    assert!(matches!(result, Err(ControllerError::Analysis(_))));

    // The device was still released exactly once
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert!(store.analyses.lock().unwrap().is_empty());
    assert!(state.history.read().await.is_empty());
    assert!(state.current_analysis.read().await.is_none());
    assert!(!state.analyzing.load(Ordering::SeqCst));

    let expected = Translations::get(Language::Es).error_analysis_failed;
    loop {
        match events.recv().await.unwrap() {
            UiEvent::UserError { message } => {
                assert_eq!(message, expected);
                break;
            }
            _ => continue,
        }
    }
}

#[tokio::test]
async fn save_failure_keeps_the_result_visible_but_out_of_history() {
    let store = Arc::new(MemoryStore::default());
    store.fail_saves.store(true, Ordering::SeqCst);
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    let state = controller.state();

    controller.start_recording().await.unwrap();
    let analysis = controller.stop_and_analyze().await.unwrap();

    // Current analysis and view advance; history reflects the store
    assert!(state.history.read().await.is_empty());
    assert_eq!(
        state.current_analysis.read().await.as_ref().map(|a| a.id.clone()),
        Some(analysis.id)
    );
    assert_eq!(*state.active_view.read().await, AppView::Analyzer);
}

#[tokio::test]
async fn notes_are_created_and_deleted_exactly() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    let state = controller.state();

    let keep = controller
        .add_note("worth revisiting".to_string(), None)
        .await
        .unwrap();
    let gone = controller
        .add_note("delete me".to_string(), None)
        .await
        .unwrap();

    controller.delete_note(&gone.id).await.unwrap();

    let notes = state.notes.read().await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, keep.id);
    assert_eq!(store.notes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_note_content_is_rejected() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));

    let result = controller.add_note("   ".to_string(), None).await;
    assert!(matches!(result, Err(ControllerError::InvalidInput(_))));
    assert!(store.notes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_delete_leaves_the_local_list_untouched() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    let state = controller.state();

    let note = controller
        .add_note("sticky".to_string(), None)
        .await
        .unwrap();
    store.fail_deletes.store(true, Ordering::SeqCst);

    let result = controller.delete_note(&note.id).await;
    assert!(matches!(result, Err(ControllerError::Persistence(_))));
    assert_eq!(state.notes.read().await.len(), 1);
}

#[tokio::test]
async fn recommendation_note_is_templated_and_linked() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    let state = controller.state();

    controller.start_recording().await.unwrap();
    let analysis = controller.stop_and_analyze().await.unwrap();

    let note = controller.add_note_for_recommendation(0).await.unwrap();
    assert_eq!(
        note.content,
        "Must check out Feather by Nujabes. Vibe: Same warm boom-bap swing."
    );
    assert_eq!(note.related_analysis_id.as_deref(), Some(analysis.id.as_str()));
    assert_eq!(state.notes.read().await.len(), 1);

    let missing = controller.add_note_for_recommendation(5).await;
    assert!(matches!(missing, Err(ControllerError::NotFound(_))));
}

#[tokio::test]
async fn chat_reply_is_appended_after_the_user_message() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    controller.load_initial_state().await;

    let reply = controller
        .send_chat_message("what is this groove?".to_string())
        .await
        .unwrap();
    assert_eq!(reply, "Try some jazzy breaks next.");

    let state = controller.state();
    let chat = state.chat.read().await;
    assert_eq!(chat.len(), 3);
    assert_eq!(chat[1].role, ChatRole::User);
    assert_eq!(chat[1].content, "what is this groove?");
    assert_eq!(chat[2].role, ChatRole::Assistant);
    assert_eq!(chat[2].content, "Try some jazzy breaks next.");
}

#[tokio::test]
async fn failed_chat_appends_the_localized_error_message() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::failing()), Arc::clone(&store));
    controller.load_initial_state().await;

    let reply = controller
        .send_chat_message("hello?".to_string())
        .await
        .unwrap();
    assert_eq!(reply, Translations::get(Language::Es).chat_error);

    let state = controller.state();
    let chat = state.chat.read().await;
    // Greeting, user message, error reply; nothing removed
    assert_eq!(chat.len(), 3);
    assert_eq!(chat[0].content, Translations::get(Language::Es).chat_intro);
}

#[tokio::test]
async fn language_toggle_reseeds_an_untouched_greeting() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    controller.load_initial_state().await;

    let state = controller.state();
    assert_eq!(
        state.chat.read().await[0].content,
        Translations::get(Language::Es).chat_intro
    );

    let language = controller.toggle_language().await;
    assert_eq!(language, Language::En);
    let chat = state.chat.read().await;
    assert_eq!(chat.len(), 1);
    assert_eq!(chat[0].content, Translations::get(Language::En).chat_intro);
}

#[tokio::test]
async fn language_toggle_preserves_a_transcript_with_user_messages() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    controller.load_initial_state().await;

    controller
        .send_chat_message("save this".to_string())
        .await
        .unwrap();

    let state = controller.state();
    let before = state.chat.read().await.clone();
    controller.toggle_language().await;
    let after = state.chat.read().await.clone();
    assert_eq!(before, after);
}

#[tokio::test]
async fn selecting_history_displays_the_stored_entry_unchanged() {
    let store = Arc::new(MemoryStore::default());
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));
    let state = controller.state();

    controller.start_recording().await.unwrap();
    let analysis = controller.stop_and_analyze().await.unwrap();
    controller.set_view(AppView::History).await;

    controller.select_history_entry(&analysis.id).await.unwrap();
    assert_eq!(*state.active_view.read().await, AppView::Analyzer);
    let current = state.current_analysis.read().await.clone().unwrap();
    assert_eq!(current, analysis);

    let missing = controller.select_history_entry("no-such-id").await;
    assert!(matches!(missing, Err(ControllerError::NotFound(_))));
}

#[tokio::test]
async fn initial_load_survives_a_store_outage() {
    let store = Arc::new(MemoryStore::default());
    store.fail_saves.store(true, Ordering::SeqCst);
    let (controller, _) = counting_controller(Arc::new(StubAnalysis::ok()), Arc::clone(&store));

    // fetch_* succeed with empty lists here; a greeting is still seeded
    controller.load_initial_state().await;
    let state = controller.state();
    assert!(state.history.read().await.is_empty());
    assert_eq!(state.chat.read().await.len(), 1);
}
