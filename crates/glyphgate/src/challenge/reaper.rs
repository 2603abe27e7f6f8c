//! Background sweep of expired sessions.
//!
//! Memory hygiene only: `SessionManager::verify` re-checks expiry itself, so
//! a late or skipped sweep never lets a dead session through.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use super::SessionManager;

/// Periodically remove expired sessions until shutdown is signalled
pub async fn session_reaper(
    sessions: Arc<SessionManager>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::info!("🧹 Session reaper started (interval: {:?})", interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = sessions.reap_expired().await;
                if removed > 0 {
                    let remaining = sessions.active_sessions().await;
                    tracing::debug!(
                        removed = removed,
                        remaining = remaining,
                        "Reaped expired sessions"
                    );
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("🧹 Session reaper shutting down...");
                break;
            }
        }
    }
}
