//! Error taxonomy for challenge issuance and verification.

use thiserror::Error;

use crate::constants::codes;

/// Every locally classified outcome that is not a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Malformed input: missing or wrong-typed fields, wrong-length candidate
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown user at challenge time
    #[error("User not found")]
    UserNotFound,

    /// Unknown or already removed session id
    #[error("Invalid session")]
    InvalidSession,

    /// Session already consumed by a successful verification
    #[error("Session already used")]
    SessionUsed,

    /// Session TTL elapsed
    #[error("Session expired")]
    SessionExpired,

    /// Attempt budget exhausted
    #[error("Maximum verification attempts exceeded")]
    MaxAttemptsExceeded,

    /// Candidate did not match, attempts remain
    #[error("Pattern mismatch ({attempts_remaining} attempts remaining)")]
    PatternMismatch { attempts_remaining: u32 },

    /// Registry or symbol pool misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Machine-readable code sent to the caller
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => codes::INVALID_REQUEST,
            Self::UserNotFound => codes::USER_NOT_FOUND,
            Self::InvalidSession => codes::INVALID_SESSION,
            Self::SessionUsed => codes::SESSION_USED,
            Self::SessionExpired => codes::SESSION_EXPIRED,
            Self::MaxAttemptsExceeded => codes::MAX_ATTEMPTS,
            Self::PatternMismatch { .. } => codes::INVALID_PATTERN,
            Self::Config(_) | Self::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::UserNotFound => 404,
            Self::InvalidSession
            | Self::SessionUsed
            | Self::SessionExpired
            | Self::MaxAttemptsExceeded
            | Self::PatternMismatch { .. } => 401,
            Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true for outcomes reported with the uniform `FAIL` verdict
    pub fn is_verification_failure(&self) -> bool {
        self.status_code() == 401
    }

    /// Attempts left on the session, when the outcome carries that
    pub fn attempts_remaining(&self) -> Option<u32> {
        match self {
            Self::PatternMismatch { attempts_remaining } => Some(*attempts_remaining),
            Self::MaxAttemptsExceeded => Some(0),
            _ => None,
        }
    }
}
