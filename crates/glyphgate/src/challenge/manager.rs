//! Session lifecycle and verification state machine.
//!
//! Every read-modify-write against the session table happens under a single
//! table-wide lock. Hashing and randomness are the only work done while it
//! is held.

use chrono::{DateTime, TimeDelta, Utc};
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;

use glyphgate_common::constants::{PATTERN_LEN, PATTERN_SEPARATOR, PEPPER_BYTES, SESSION_ID_BYTES};
use glyphgate_common::{AuthError, Challenge, MetricsSnapshot, SessionStatus, Symbol, Verified};

use super::{GridGenerator, SecretStore, Session};

/// Lifetime counters
#[derive(Default)]
struct SessionStats {
    issued: AtomicU64,
    passed: AtomicU64,
    mismatches: AtomicU64,
    lockouts: AtomicU64,
    expired: AtomicU64,
    replays: AtomicU64,
    unknown: AtomicU64,
    reaped: AtomicU64,
}

impl SessionStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Owner of the session table
pub struct SessionManager {
    secrets: Arc<SecretStore>,
    grid: GridGenerator,
    ttl_secs: u64,
    max_attempts: u32,
    sessions: Mutex<HashMap<String, Session>>,
    stats: SessionStats,
}

impl SessionManager {
    pub fn new(
        secrets: Arc<SecretStore>,
        grid: GridGenerator,
        ttl_secs: u64,
        max_attempts: u32,
    ) -> Self {
        Self {
            secrets,
            grid,
            ttl_secs,
            max_attempts,
            sessions: Mutex::new(HashMap::new()),
            stats: SessionStats::default(),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a new single-use challenge for `user_id`
    pub async fn start_challenge(&self, user_id: &str) -> Result<Challenge, AuthError> {
        self.start_challenge_at(user_id, Utc::now()).await
    }

    pub(crate) async fn start_challenge_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Challenge, AuthError> {
        let secret = self.secrets.lookup(user_id)?;

        let pepper: [u8; PEPPER_BYTES] = random_bytes()?;
        let secret_hash = pattern_digest(&pepper, secret);
        let grid = self.grid.generate(secret)?;
        let session_id = generate_session_id()?;

        let expires_at = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .filter(|expires_at| *expires_at > now)
            .ok_or_else(|| AuthError::Internal("session TTL out of range".into()))?;

        let session = Session {
            user_id: user_id.to_string(),
            secret_hash,
            pepper,
            grid: grid.clone(),
            created_at: now,
            expires_at,
            attempts: 0,
            max_attempts: self.max_attempts,
            used: false,
        };

        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session_id) {
            // 128-bit ids; a collision means the random source is broken
            return Err(AuthError::Internal("session id collision".into()));
        }
        sessions.insert(session_id.clone(), session);
        drop(sessions);

        SessionStats::bump(&self.stats.issued);
        tracing::debug!(
            session_id = %session_id,
            user_id = %user_id,
            ttl_secs = self.ttl_secs,
            "Issued challenge"
        );

        Ok(Challenge {
            session_id,
            grid,
            expires_in: self.ttl_secs,
        })
    }

    /// Verify a candidate selection against a session
    pub async fn verify(
        &self,
        session_id: &str,
        candidate: &[Symbol],
    ) -> Result<Verified, AuthError> {
        self.verify_at(session_id, candidate, Utc::now()).await
    }

    pub(crate) async fn verify_at(
        &self,
        session_id: &str,
        candidate: &[Symbol],
        now: DateTime<Utc>,
    ) -> Result<Verified, AuthError> {
        if candidate.len() != PATTERN_LEN {
            return Err(AuthError::InvalidRequest(format!(
                "input must contain {} symbols, got {}",
                PATTERN_LEN,
                candidate.len()
            )));
        }

        let mut sessions = self.sessions.lock().await;

        let Some(session) = sessions.get_mut(session_id) else {
            SessionStats::bump(&self.stats.unknown);
            tracing::debug!(session_id = %session_id, "Verification for unknown session");
            return Err(AuthError::InvalidSession);
        };

        if session.used {
            sessions.remove(session_id);
            SessionStats::bump(&self.stats.replays);
            tracing::warn!(session_id = %session_id, "Replay against used session");
            return Err(AuthError::SessionUsed);
        }

        if now > session.expires_at {
            sessions.remove(session_id);
            SessionStats::bump(&self.stats.expired);
            tracing::debug!(session_id = %session_id, "Verification for expired session");
            return Err(AuthError::SessionExpired);
        }

        if session.attempts >= session.max_attempts {
            sessions.remove(session_id);
            SessionStats::bump(&self.stats.lockouts);
            return Err(AuthError::MaxAttemptsExceeded);
        }

        // Counted before comparing so a failed comparison still costs an attempt
        session.attempts += 1;

        let candidate_hash = pattern_digest(&session.pepper, candidate);
        let matched: bool = candidate_hash[..].ct_eq(&session.secret_hash[..]).into();

        if matched {
            session.used = true;
            let user_id = session.user_id.clone();
            let attempts = session.attempts;

            // Budget spent: no tombstone, the session goes now
            if attempts >= session.max_attempts {
                sessions.remove(session_id);
            }

            SessionStats::bump(&self.stats.passed);
            tracing::info!(
                session_id = %session_id,
                user_id = %user_id,
                attempts = attempts,
                "Challenge verified"
            );

            return Ok(Verified {
                user_id,
                verified_at: now,
            });
        }

        let attempts = session.attempts;
        let max_attempts = session.max_attempts;
        let user_id = session.user_id.clone();

        if attempts >= max_attempts {
            sessions.remove(session_id);
            SessionStats::bump(&self.stats.lockouts);
            tracing::warn!(
                session_id = %session_id,
                user_id = %user_id,
                attempts = attempts,
                "Session locked out after failed attempts"
            );
            return Err(AuthError::MaxAttemptsExceeded);
        }

        SessionStats::bump(&self.stats.mismatches);
        tracing::debug!(
            session_id = %session_id,
            user_id = %user_id,
            attempts = attempts,
            "Pattern mismatch"
        );

        Err(AuthError::PatternMismatch {
            attempts_remaining: max_attempts - attempts,
        })
    }

    /// Non-secret view of a session. Never changes state.
    pub async fn status(&self, session_id: &str) -> Option<SessionStatus> {
        self.status_at(session_id, Utc::now()).await
    }

    pub(crate) async fn status_at(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Option<SessionStatus> {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).map(|s| SessionStatus {
            session_id: session_id.to_string(),
            user_id: s.user_id.clone(),
            grid: s.grid.clone(),
            created_at: s.created_at,
            expires_at: s.expires_at,
            attempts: s.attempts,
            max_attempts: s.max_attempts,
            used: s.used,
            expired: now > s.expires_at,
        })
    }

    /// Remove every session whose expiry has passed. Returns the count removed.
    pub async fn reap_expired(&self) -> usize {
        self.reap_expired_at(Utc::now()).await
    }

    pub(crate) async fn reap_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at >= now);
        let removed = before - sessions.len();
        drop(sessions);

        self.stats.reaped.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Current size of the session table
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Get statistics snapshot
    pub async fn stats(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_sessions: self.active_sessions().await,
            challenges_issued: self.stats.issued.load(Ordering::Relaxed),
            passed: self.stats.passed.load(Ordering::Relaxed),
            mismatches: self.stats.mismatches.load(Ordering::Relaxed),
            lockouts: self.stats.lockouts.load(Ordering::Relaxed),
            expired: self.stats.expired.load(Ordering::Relaxed),
            replays: self.stats.replays.load(Ordering::Relaxed),
            unknown_sessions: self.stats.unknown.load(Ordering::Relaxed),
            reaped: self.stats.reaped.load(Ordering::Relaxed),
        }
    }
}

/// SHA-256 over the session pepper and the `|`-joined pattern
fn pattern_digest(pepper: &[u8], pattern: &[Symbol]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(pepper);
    hasher.update(pattern.join(PATTERN_SEPARATOR).as_bytes());
    hasher.finalize().into()
}

fn random_bytes<const N: usize>() -> Result<[u8; N], AuthError> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Internal(format!("random source failure: {}", e)))?;
    Ok(bytes)
}

/// Generate a cryptographically random session ID
fn generate_session_id() -> Result<String, AuthError> {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    let bytes: [u8; SESSION_ID_BYTES] = random_bytes()?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
