//! Application state and shared resources.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

use crate::challenge::{GridGenerator, SecretStore, SessionManager};
use crate::config::AppConfig;
use glyphgate_common::constants::{GRID_SIZE, SYMBOL_POOL};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Session table owner
    pub sessions: Arc<SessionManager>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Build state from config, validating the secret registry against the symbol pool
    pub fn new(config: AppConfig) -> Result<Self> {
        let secrets =
            SecretStore::from_entries(config.secret_entries()).context("Invalid secret registry")?;

        let grid = GridGenerator::new(SYMBOL_POOL, GRID_SIZE);
        for (user_id, pattern) in secrets.patterns() {
            grid.check_capacity(pattern)
                .with_context(|| format!("Symbol pool cannot serve user '{}'", user_id))?;
        }

        if secrets.is_empty() {
            tracing::warn!("No secrets registered; every challenge request will be rejected");
        } else {
            tracing::info!(users = secrets.len(), "Secret registry loaded");
        }

        let sessions = Arc::new(SessionManager::new(
            Arc::new(secrets),
            grid,
            config.session.ttl_secs,
            config.session.max_attempts,
        ));

        Ok(Self {
            config,
            sessions,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the state was built
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
