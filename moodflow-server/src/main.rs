//! moodflow-server - Mood-driven music recommendation service
//!
//! Accepts an audio upload, extracts acoustic descriptors, classifies a
//! coarse mood/genre, and turns the labels into catalog-backed artist,
//! track, album, and playlist panels, with an optional playlist write-back
//! to the user's account.

use anyhow::{Context, Result};
use clap::Parser;
use moodflow_common::config::AppConfig;
use moodflow_server::{build_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for moodflow-server
#[derive(Parser, Debug)]
#[command(name = "moodflow-server")]
#[command(about = "Mood-driven music recommendation service")]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "MOODFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodflow_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting MoodFlow v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config = AppConfig::resolve(args.config.as_deref())
        .context("Failed to resolve configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if !config.catalog.is_configured() {
        warn!(
            "Catalog credentials not configured. Set MOODFLOW_CLIENT_ID / \
             MOODFLOW_CLIENT_SECRET or add a [catalog] section to the config \
             file; catalog panels will fail until then."
        );
    }
    info!(history = %config.history.path.display(), "Session history file");

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .context("Invalid server.host in configuration")?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState::new(config).context("Failed to initialize application state")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
