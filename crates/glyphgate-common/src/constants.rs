//! Shared constants for Glyphgate components.

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8888";

/// Challenge session validity in seconds
pub const SESSION_TTL_SECS: u64 = 60;

/// Upper bound accepted for a configured session TTL (1 day)
pub const MAX_SESSION_TTL_SECS: u64 = 86_400;

/// Verification attempts allowed per session
pub const MAX_ATTEMPTS: u32 = 3;

/// How often expired sessions are swept from the table (seconds)
pub const REAP_INTERVAL_SECS: u64 = 30;

/// Per-request timeout for the HTTP layer (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Number of symbols in a secret pattern
pub const PATTERN_LEN: usize = 3;

/// Number of symbols shown in a challenge grid
pub const GRID_SIZE: usize = 9;

/// Separator used when joining a pattern before hashing
pub const PATTERN_SEPARATOR: &str = "|";

/// Random bytes in a session id (128 bits)
pub const SESSION_ID_BYTES: usize = 16;

/// Random bytes in the per-session digest pepper
pub const PEPPER_BYTES: usize = 16;

/// Symbols decoys are drawn from.
pub const SYMBOL_POOL: &[&str] = &[
    "🍎", "🚗", "🌙", "⭐", "🐟", "🔑", "🎈", "🌵", "⚓", "🔔", "🍄", "🎲", "🦉", "🌊", "🔥",
    "🍋",
];

/// Machine-readable error codes returned to clients
pub mod codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub const INVALID_SESSION: &str = "INVALID_SESSION";
    pub const SESSION_USED: &str = "SESSION_USED";
    pub const SESSION_EXPIRED: &str = "SESSION_EXPIRED";
    pub const MAX_ATTEMPTS: &str = "MAX_ATTEMPTS";
    pub const INVALID_PATTERN: &str = "INVALID_PATTERN";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
