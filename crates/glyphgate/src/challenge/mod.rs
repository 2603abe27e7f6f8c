//! Challenge issuance and verification.
//!
//! - `secrets` - static user → pattern registry
//! - `grid` - decoy sampling and shuffling
//! - `manager` - session table and verification state machine
//! - `reaper` - background sweep of expired sessions

mod grid;
mod manager;
mod reaper;
mod secrets;

pub use grid::GridGenerator;
pub use manager::SessionManager;
pub use reaper::session_reaper;
pub use secrets::SecretStore;

use chrono::{DateTime, Utc};
use glyphgate_common::Symbol;
use glyphgate_common::constants::PEPPER_BYTES;

/// Server-side session record. Never leaves `SessionManager`.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    /// Owning user
    pub user_id: String,
    /// SHA-256(pepper || joined pattern)
    pub secret_hash: [u8; 32],
    /// Per-session random pepper mixed into the digest
    pub pepper: [u8; PEPPER_BYTES],
    /// Grid as issued
    pub grid: Vec<Symbol>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Verification attempts consumed
    pub attempts: u32,
    pub max_attempts: u32,
    /// Set once a verification succeeds
    pub used: bool,
}
