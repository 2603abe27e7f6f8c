//! Static registry of user secret patterns.

use std::collections::HashMap;

use glyphgate_common::constants::PATTERN_LEN;
use glyphgate_common::{AuthError, Symbol};

/// Read-only map of user id to ordered secret pattern
#[derive(Debug, Default)]
pub struct SecretStore {
    patterns: HashMap<String, Vec<Symbol>>,
}

impl SecretStore {
    /// Build the store, rejecting entries the grid could not represent
    pub fn from_entries<I>(entries: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (String, Vec<Symbol>)>,
    {
        let mut patterns = HashMap::new();

        for (user_id, pattern) in entries {
            if user_id.trim().is_empty() {
                return Err(AuthError::Config("secret entry with empty user_id".into()));
            }
            if pattern.len() != PATTERN_LEN {
                return Err(AuthError::Config(format!(
                    "pattern for user '{}' has {} symbols, expected {}",
                    user_id,
                    pattern.len(),
                    PATTERN_LEN
                )));
            }
            if pattern.iter().any(|s| s.is_empty()) {
                return Err(AuthError::Config(format!(
                    "pattern for user '{}' contains an empty symbol",
                    user_id
                )));
            }
            // Grid symbols must be unique, so the pattern's must be too
            for (i, symbol) in pattern.iter().enumerate() {
                if pattern[..i].contains(symbol) {
                    return Err(AuthError::Config(format!(
                        "pattern for user '{}' repeats a symbol",
                        user_id
                    )));
                }
            }
            if patterns.contains_key(&user_id) {
                return Err(AuthError::Config(format!(
                    "duplicate secret entry for user '{}'",
                    user_id
                )));
            }

            patterns.insert(user_id, pattern);
        }

        Ok(Self { patterns })
    }

    /// Resolve a user's secret pattern
    pub fn lookup(&self, user_id: &str) -> Result<&[Symbol], AuthError> {
        if user_id.is_empty() {
            return Err(AuthError::InvalidRequest("user_id must not be empty".into()));
        }

        self.patterns
            .get(user_id)
            .map(Vec::as_slice)
            .ok_or(AuthError::UserNotFound)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate over every registered pattern
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &[Symbol])> {
        self.patterns
            .iter()
            .map(|(user, pattern)| (user.as_str(), pattern.as_slice()))
    }
}
