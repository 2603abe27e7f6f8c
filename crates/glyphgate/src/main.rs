//! # Glyphgate - Symbol-Grid Challenge Authenticator
//!
//! Issues single-use challenge grids that hide a user's secret symbol
//! sequence among decoys, and verifies ordered selections against it.
//!
//! ## Architecture
//! ```text
//! TLS proxy → Glyphgate (axum) → SessionManager ← SecretStore
//!                                      ↑
//!                               session reaper
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod challenge;
mod config;
mod routes;
mod state;

use crate::challenge::session_reaper;
use crate::config::AppConfig;
use crate::state::AppState;

/// Glyphgate - single-use symbol-grid authenticator
#[derive(Parser, Debug)]
#[command(name = "glyphgate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/glyphgate.toml", env = "GLYPHGATE_CONFIG")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!(
        "🔐 Starting Glyphgate v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!("📋 Configuration loaded from {}", args.config);

    // Initialize application state (fails on a bad secret registry)
    let state = AppState::new(config.clone()).context("Failed to initialize application state")?;
    info!(
        ttl_secs = state.sessions.ttl_secs(),
        max_attempts = config.session.max_attempts,
        "✅ Session manager ready"
    );

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Spawn session reaper
    let reaper = tokio::spawn(session_reaper(
        state.sessions.clone(),
        Duration::from_secs(config.session.reap_interval_secs),
        shutdown_tx.subscribe(),
    ));

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("🚀 Glyphgate listening on {}", config.listen_addr);

    // Handle graceful shutdown
    let signal_tx = shutdown_tx.clone();
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
        info!("🛑 Shutdown signal received");
        let _ = signal_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    // Stop the reaper even if the server exited on its own
    let _ = shutdown_tx.send(());
    if let Err(e) = reaper.await {
        tracing::error!(error = %e, "Session reaper task failed");
    }

    info!("👋 Glyphgate shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}
