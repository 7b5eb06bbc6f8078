//! UI event types
//!
//! Events are broadcast to connected clients over SSE and drive state
//! refreshes; visualizer frames ride the same channel as draw command
//! batches.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vibesync_common::AppView;

use crate::visualizer::{DrawCommand, Surface, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Events emitted by the controller and the visualizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// Any part of the application state changed; clients re-fetch
    StateChanged,

    /// A recording session started
    RecordingStarted,

    /// A recording session stopped; analysis may follow
    RecordingStopped,

    /// A new analysis landed at the top of history
    AnalysisComplete { id: String },

    /// The active view switched
    ViewChanged { view: AppView },

    /// One visualizer animation frame as an ordered command batch
    VisualizerFrame { commands: Vec<DrawCommand> },

    /// A user-facing error scoped to a single action
    UserError { message: String },
}

impl UiEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            UiEvent::StateChanged => "state_changed",
            UiEvent::RecordingStarted => "recording_started",
            UiEvent::RecordingStopped => "recording_stopped",
            UiEvent::AnalysisComplete { .. } => "analysis_complete",
            UiEvent::ViewChanged { .. } => "view_changed",
            UiEvent::VisualizerFrame { .. } => "visualizer_frame",
            UiEvent::UserError { .. } => "user_error",
        }
    }
}

/// Drawing surface that publishes each frame batch to SSE clients
pub struct EventSurface {
    events: broadcast::Sender<UiEvent>,
}

impl EventSurface {
    pub fn new(events: broadcast::Sender<UiEvent>) -> Self {
        Self { events }
    }
}

impl Surface for EventSurface {
    fn width(&self) -> f32 {
        CANVAS_WIDTH
    }

    fn height(&self) -> f32 {
        CANVAS_HEIGHT
    }

    fn submit(&mut self, commands: Vec<DrawCommand>) {
        // No listeners is fine; frames are ephemeral
        let _ = self.events.send(UiEvent::VisualizerFrame { commands });
    }
}
