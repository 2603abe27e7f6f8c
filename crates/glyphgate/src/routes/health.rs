//! Health check and metrics endpoints.

use axum::{Json, extract::State};
use serde::Serialize;

use glyphgate_common::MetricsSnapshot;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    active_sessions: usize,
    uptime_secs: u64,
}

/// Liveness check with the current session-table size
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.sessions.active_sessions().await,
        uptime_secs: state.uptime_secs(),
    })
}

/// Metrics endpoint (for monitoring)
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.sessions.stats().await)
}
