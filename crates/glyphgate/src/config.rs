//! Configuration management for Glyphgate.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use glyphgate_common::Symbol;
use glyphgate_common::constants::{
    DEFAULT_LISTEN_ADDR, MAX_ATTEMPTS, MAX_SESSION_TTL_SECS, REAP_INTERVAL_SECS,
    REQUEST_TIMEOUT_SECS, SESSION_TTL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Session lifecycle configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Registered secret patterns, loaded once at startup
    #[serde(default = "default_secrets")]
    pub secrets: Vec<SecretConfig>,
}

/// Session-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Challenge validity in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Verification attempts per session
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Interval between expired-session sweeps
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,

    /// Per-request timeout for the HTTP layer
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_attempts: default_max_attempts(),
            reap_interval_secs: default_reap_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// One registry entry
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    pub user_id: String,
    pub pattern: Vec<Symbol>,
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_ttl() -> u64 { SESSION_TTL_SECS } // 1 minute
fn default_max_attempts() -> u32 { MAX_ATTEMPTS }
fn default_reap_interval() -> u64 { REAP_INTERVAL_SECS }
fn default_request_timeout() -> u64 { REQUEST_TIMEOUT_SECS }

fn default_secrets() -> Vec<SecretConfig> {
    vec![SecretConfig {
        user_id: "demo".to_string(),
        pattern: vec!["🍎".to_string(), "🌙".to_string(), "🔑".to_string()],
    }]
}

impl AppConfig {
    /// Load configuration from file, with environment and CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .add_source(
                    config::Environment::with_prefix("GLYPHGATE")
                        .prefix_separator("_")
                        .separator("__"),
                )
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break session invariants
    pub fn validate(&self) -> Result<()> {
        if self.session.ttl_secs == 0 {
            bail!("session.ttl_secs must be at least 1");
        }
        if self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            bail!(
                "session.ttl_secs must be at most {} (got {})",
                MAX_SESSION_TTL_SECS,
                self.session.ttl_secs
            );
        }
        if self.session.max_attempts == 0 {
            bail!("session.max_attempts must be at least 1");
        }
        if self.session.reap_interval_secs == 0 {
            bail!("session.reap_interval_secs must be at least 1");
        }
        if self.session.request_timeout_secs == 0 {
            bail!("session.request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Registry entries in the shape `SecretStore` expects
    pub fn secret_entries(&self) -> impl Iterator<Item = (String, Vec<Symbol>)> + '_ {
        self.secrets
            .iter()
            .map(|s| (s.user_id.clone(), s.pattern.clone()))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            session: SessionConfig::default(),
            secrets: default_secrets(),
        }
    }
}
