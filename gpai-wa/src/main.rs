//! gpai-wa (WhatsApp Assistant) - chat-driven GPA calculator service
//!
//! Receives Twilio WhatsApp webhooks, drives the per-user conversation
//! state machine, and persists finalized semesters.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use gpai_common::config::GpaiConfig;
use gpai_wa::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "gpai-wa", about = "GPAi WhatsApp assistant service")]
struct Args {
    /// Root folder holding the database (overrides GPAI_ROOT and TOML)
    #[arg(long)]
    root_folder: Option<String>,

    /// Bind address, e.g. 127.0.0.1:5740
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting GPAi WhatsApp Assistant (gpai-wa) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = GpaiConfig::resolve(args.root_folder.as_deref(), args.bind.as_deref())?;
    config.ensure_root_folder()?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());
    let pool = gpai_common::db::init_database(&db_path).await?;

    let state = AppState::new(pool, &config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("gpai-wa listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
