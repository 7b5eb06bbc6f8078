//! vibesync-ui - client application for VibeSync
//!
//! Wires the microphone recorder, live visualizer, Gemini analysis and
//! chat clients, and the persistence client into the view controller, then
//! serves the UI and control API over HTTP.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use vibesync_common::config;
use vibesync_ui::backend::BackendClient;
use vibesync_ui::capture::CpalRecorder;
use vibesync_ui::controller::{Controller, SharedState};
use vibesync_ui::events::EventSurface;
use vibesync_ui::gemini::GeminiClient;
use vibesync_ui::server::build_router;
use vibesync_ui::visualizer::{FrameScheduler, IntervalScheduler, Visualizer};

/// Visualizer frame cadence (display-sync stand-in)
const FRAMES_PER_SECOND: u32 = 60;

#[derive(Parser, Debug)]
#[command(name = "vibesync-ui", about = "VibeSync client application")]
struct Args {
    /// Root folder for configuration (overrides VIBESYNC_ROOT)
    #[arg(long)]
    root: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = config::DEFAULT_UI_PORT)]
    port: u16,

    /// Base URL of the persistence service
    #[arg(long)]
    store_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting VibeSync UI v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let api_key = config::resolve_gemini_api_key();
    if api_key.is_none() {
        warn!("No Gemini API key configured; analysis will return placeholder results");
    }
    let gemini = GeminiClient::new(api_key)?;

    let store_url = args
        .store_url
        .unwrap_or_else(|| format!("http://127.0.0.1:{}", config::DEFAULT_STORE_PORT));
    info!("Persistence service: {store_url}");
    let backend = BackendClient::new(store_url)?;

    let state = Arc::new(SharedState::new());
    let surface = EventSurface::new(state.event_sender());
    let visualizer = Visualizer::new(Some(Arc::new(Mutex::new(surface))));

    let controller = Arc::new(Controller::new(
        state,
        Box::new(CpalRecorder),
        Arc::new(gemini),
        Arc::new(backend),
        visualizer,
        Box::new(|| Box::new(IntervalScheduler::new(FRAMES_PER_SECOND)) as Box<dyn FrameScheduler>),
    ));

    controller.load_initial_state().await;

    let app = build_router(Arc::clone(&controller));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("vibesync-ui listening on http://127.0.0.1:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
