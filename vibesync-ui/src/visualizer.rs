//! Live visualizer
//!
//! Renders a frequency-bar animation of the live microphone signal,
//! synchronized to the recording flag. The drawing target is abstracted
//! behind [`Surface`] (one command batch per frame); the display-sync
//! callback is abstracted behind [`FrameScheduler`]. The animation loop is
//! a cooperative task that re-checks the recording flag every cycle and is
//! cancelled via an explicit handle on teardown, so a forgotten cancel
//! cannot leak a running loop.
//!
//! No audio data is retained after each frame's draw; the component holds
//! no history and cannot replay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::capture::LiveStream;
use crate::spectrum::{SpectrumAnalyser, BIN_COUNT};

/// Fixed canvas dimensions
pub const CANVAS_WIDTH: f32 = 600.0;
pub const CANVAS_HEIGHT: f32 = 200.0;

/// Background the canvas is cleared to while animating
pub const BACKGROUND_COLOR: &str = "#0a0a12";

/// Vertical gradient accents, bottom to top
pub const GRADIENT_FROM: &str = "#b026ff";
pub const GRADIENT_TO: &str = "#00ff9d";

/// Horizontal gap between bars
pub const BAR_GUTTER: f32 = 2.0;

/// Rounded corner radius on each bar
pub const BAR_RADIUS: f32 = 5.0;

/// One drawing primitive. A frame is an ordered batch of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Clear the canvas to blank
    Clear,
    /// Fill the whole canvas with a solid color
    FillBackground { color: String },
    /// One rounded bar with a two-stop vertical gradient fill
    Bar {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        gradient_from: String,
        gradient_to: String,
    },
}

/// Drawing target. When none is available the visualizer is silently
/// inert; a missing drawing context is a rendering capability failure,
/// not business logic.
pub trait Surface: Send {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    /// Apply one frame's command batch
    fn submit(&mut self, commands: Vec<DrawCommand>);
}

/// Display-sync callback stand-in. Each awaited tick is one frame slot;
/// returning false means the display is gone.
#[async_trait]
pub trait FrameScheduler: Send {
    async fn next_frame(&mut self) -> bool;
}

/// Production scheduler ticking at a fixed cadence
pub struct IntervalScheduler {
    interval: tokio::time::Interval,
}

impl IntervalScheduler {
    pub fn new(fps: u32) -> Self {
        let period = std::time::Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl FrameScheduler for IntervalScheduler {
    async fn next_frame(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Bar width for a given canvas width and bin count.
///
/// Bars intentionally overlap the nominal per-bin slot width (the 2.5
/// multiplier), producing a denser visual than a strict partition.
pub fn bar_width(canvas_width: f32, bin_count: usize) -> f32 {
    canvas_width / bin_count as f32 * 2.5
}

/// Build one frame's command batch from a magnitude snapshot
pub fn frame_commands(canvas_width: f32, canvas_height: f32, bins: &[u8]) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(bins.len() + 1);
    commands.push(DrawCommand::FillBackground {
        color: BACKGROUND_COLOR.to_string(),
    });

    let width = bar_width(canvas_width, bins.len());
    let mut x = 0.0f32;
    for &magnitude in bins {
        // Half-scale factor keeps the bars inside the canvas
        let height = f32::from(magnitude) / 2.0;
        commands.push(DrawCommand::Bar {
            x,
            y: canvas_height - height,
            width,
            height,
            radius: BAR_RADIUS,
            gradient_from: GRADIENT_FROM.to_string(),
            gradient_to: GRADIENT_TO.to_string(),
        });
        x += width + BAR_GUTTER;
    }
    commands
}

/// Externally observable visualizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizerState {
    /// No stream attached
    Idle,
    /// Stream attached, analysis node created, no frames scheduling
    Bound,
    /// Recording flag true, frames scheduling
    Animating,
}

/// Cancellation handle for a running animation loop
pub struct AnimationHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl AnimationHandle {
    /// Cancel pending frames and wait for the loop to exit
    pub async fn teardown(self) {
        self.token.cancel();
        let _ = self.task.await;
    }

    fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// The live visualizer component.
///
/// Transitions are driven externally by (stream presence, recording flag)
/// pair changes; there are no internal timers independent of those inputs.
pub struct Visualizer {
    surface: Option<Arc<Mutex<dyn Surface>>>,
    analyser: Option<Arc<Mutex<SpectrumAnalyser>>>,
    stream_id: Option<Uuid>,
    animation: Option<AnimationHandle>,
}

impl Visualizer {
    pub fn new(surface: Option<Arc<Mutex<dyn Surface>>>) -> Self {
        Self {
            surface,
            analyser: None,
            stream_id: None,
            animation: None,
        }
    }

    pub fn state(&self) -> VisualizerState {
        if self.animation.as_ref().is_some_and(AnimationHandle::is_running) {
            VisualizerState::Animating
        } else if self.analyser.is_some() {
            VisualizerState::Bound
        } else {
            VisualizerState::Idle
        }
    }

    /// Attach a live stream, creating the analysis node.
    ///
    /// The node is created at most once per stream lifetime; rebinding the
    /// same stream is a no-op, and a changed stream reference tears down
    /// the previous animation handle before the new binding is made.
    pub async fn bind(&mut self, stream: &LiveStream) {
        if self.stream_id == Some(stream.id()) {
            return;
        }
        if let Some(handle) = self.animation.take() {
            handle.teardown().await;
        }
        debug!(stream_id = %stream.id(), "Visualizer bound to stream");
        self.analyser = Some(Arc::new(Mutex::new(SpectrumAnalyser::bind(stream))));
        self.stream_id = Some(stream.id());
    }

    /// Start the self-sustaining animation loop.
    ///
    /// Does nothing unless a stream is bound; without a surface the
    /// component stays silently inert in the Bound state.
    pub fn start_animation(
        &mut self,
        scheduler: Box<dyn FrameScheduler>,
        recording: Arc<AtomicBool>,
    ) {
        let Some(analyser) = self.analyser.clone() else {
            return;
        };
        let Some(surface) = self.surface.clone() else {
            return;
        };
        if self.animation.as_ref().is_some_and(AnimationHandle::is_running) {
            return;
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(animation_loop(
            scheduler,
            surface,
            analyser,
            recording,
            token.clone(),
        ));
        self.animation = Some(AnimationHandle { token, task });
    }

    /// Stop the animation loop, leaving the stream bound
    pub async fn stop_animation(&mut self) {
        if let Some(handle) = self.animation.take() {
            handle.teardown().await;
        }
    }

    /// Detach from the stream entirely (back to Idle)
    pub async fn teardown(&mut self) {
        self.stop_animation().await;
        self.analyser = None;
        self.stream_id = None;
    }
}

/// The frame loop. Checks the recording flag itself every cycle rather
/// than relying solely on external cancellation, because the flag can
/// change between schedule and execution.
async fn animation_loop(
    mut scheduler: Box<dyn FrameScheduler>,
    surface: Arc<Mutex<dyn Surface>>,
    analyser: Arc<Mutex<SpectrumAnalyser>>,
    recording: Arc<AtomicBool>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                clear_surface(&surface);
                break;
            }
            more = scheduler.next_frame() => {
                if !more {
                    clear_surface(&surface);
                    break;
                }
            }
        }

        if !recording.load(Ordering::SeqCst) {
            clear_surface(&surface);
            break;
        }

        let mut bins = [0u8; BIN_COUNT];
        if let Ok(mut analyser) = analyser.lock() {
            analyser.byte_frequency_data(&mut bins);
        }

        if let Ok(mut surface) = surface.lock() {
            let commands = frame_commands(surface.width(), surface.height(), &bins);
            surface.submit(commands);
        }
    }
}

fn clear_surface(surface: &Arc<Mutex<dyn Surface>>) {
    if let Ok(mut surface) = surface.lock() {
        surface.submit(vec![DrawCommand::Clear]);
    }
}
