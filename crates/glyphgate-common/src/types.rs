//! Core types shared across Glyphgate components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single on-screen symbol (opaque string, usually an emoji)
pub type Symbol = String;

/// Challenge data sent to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Unguessable session identifier
    pub session_id: String,

    /// Shuffled symbols containing the secret plus decoys
    pub grid: Vec<Symbol>,

    /// Seconds until the session expires
    pub expires_in: u64,
}

/// A successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verified {
    pub user_id: String,
    pub verified_at: DateTime<Utc>,
}

/// Non-secret view of a session for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub user_id: String,
    /// Grid as issued to the client
    pub grid: Vec<Symbol>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub used: bool,
    /// Past `expires_at` but not yet swept
    pub expired: bool,
}

/// Lifetime counters for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sessions currently in the table (including used/expired not yet swept)
    pub active_sessions: usize,

    /// Challenges issued
    pub challenges_issued: u64,

    /// Successful verifications
    pub passed: u64,

    /// Wrong candidates with attempts remaining
    pub mismatches: u64,

    /// Sessions locked out by the attempt cap
    pub lockouts: u64,

    /// Rejections because the session had expired
    pub expired: u64,

    /// Replays against a used session
    pub replays: u64,

    /// Verifications against unknown session ids
    pub unknown_sessions: u64,

    /// Sessions removed by the background sweep
    pub reaped: u64,
}
