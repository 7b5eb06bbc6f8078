//! vibesync-store - persistence service for VibeSync
//!
//! Serves the history and notes CRUD API over a single-file SQLite store.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use vibesync_common::config;
use vibesync_store::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "vibesync-store", about = "VibeSync persistence service")]
struct Args {
    /// Root folder holding the database (overrides VIBESYNC_ROOT)
    #[arg(long)]
    root: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = config::DEFAULT_STORE_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting VibeSync store v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let root_folder = config::resolve_root_folder(args.root.as_deref());
    let db_path = config::prepare_database_path(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let pool = vibesync_common::db::init_database(&db_path).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("vibesync-store listening on http://127.0.0.1:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
