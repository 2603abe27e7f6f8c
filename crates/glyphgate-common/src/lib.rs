//! # Glyphgate Common
//!
//! Shared types, errors, and constants used across Glyphgate components.
//!
//! ## Modules
//! - `types` - Wire types (Challenge, Verified, SessionStatus, MetricsSnapshot)
//! - `error` - Verification outcome taxonomy
//! - `constants` - Symbol pool and session defaults

pub mod constants;
pub mod error;
pub mod types;

pub use error::AuthError;
pub use types::*;
