//! Identity source configuration.
//!
//! Configuration is loaded from environment variables with typed
//! defaults. A single boolean switch selects the synthetic or remote
//! implementation at process start; nothing else in the workspace
//! branches on the mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SourceError, SourceResult};

/// Which identity source implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMode {
    /// Deterministic in-process generator. No network.
    #[default]
    Synthetic,
    /// Remote HTTP-backed registry client.
    Remote,
}

/// Identity source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Selected implementation.
    pub mode: SourceMode,

    /// Base URL for profile fetch and search (remote mode).
    pub fetch_base_url: Option<String>,

    /// Base URL for credential validation (remote mode).
    pub credential_base_url: Option<String>,

    /// Pre-shared key identifying this deployment to the registry
    /// (remote mode).
    pub api_key: Option<String>,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Total attempts for transient failures (1 initial + retries).
    pub retry_attempts: u32,

    /// Time-to-live for cached lookups.
    pub cache_ttl: Duration,

    /// Minimum secret length accepted by the synthetic source.
    pub min_secret_len: usize,

    /// Maximum simultaneous in-flight source calls during bulk
    /// reconciliation.
    pub max_in_flight: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Synthetic,
            fetch_base_url: None,
            credential_base_url: None,
            api_key: None,
            request_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            cache_ttl: Duration::from_secs(300),
            min_secret_len: 6,
            max_in_flight: 8,
        }
    }
}

impl SourceConfig {
    /// Loads configuration from environment variables.
    ///
    /// Reads a `.env` file if one exists. Unset variables fall back to
    /// the defaults above; `ITS_SYNTHETIC` defaults to true so a bare
    /// environment runs the deterministic source.
    ///
    /// ## Errors
    ///
    /// Returns [`SourceError::Configuration`] when the resulting
    /// configuration is invalid (see [`SourceConfig::validate`]).
    pub fn from_env() -> SourceResult<Self> {
        let _ = dotenvy::dotenv();

        let mode = if env_bool("ITS_SYNTHETIC").unwrap_or(true) {
            SourceMode::Synthetic
        } else {
            SourceMode::Remote
        };

        let config = Self {
            mode,
            fetch_base_url: std::env::var("ITS_FETCH_BASE_URL").ok(),
            credential_base_url: std::env::var("ITS_CREDENTIAL_BASE_URL").ok(),
            api_key: std::env::var("ITS_API_KEY").ok(),
            request_timeout: Duration::from_secs(env_parse("ITS_TIMEOUT_SECS").unwrap_or(30)),
            retry_attempts: env_parse("ITS_RETRY_ATTEMPTS").unwrap_or(3),
            cache_ttl: Duration::from_secs(env_parse("ITS_CACHE_TTL_SECS").unwrap_or(300)),
            min_secret_len: env_parse("ITS_MIN_SECRET_LEN").unwrap_or(6),
            max_in_flight: env_parse("ITS_MAX_IN_FLIGHT").unwrap_or(8),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// ## Errors
    ///
    /// Remote mode requires both base URLs and the pre-shared key;
    /// anything less is a fatal [`SourceError::Configuration`]. Zero
    /// retry attempts or a zero concurrency bound are rejected in any
    /// mode.
    pub fn validate(&self) -> SourceResult<()> {
        if self.retry_attempts == 0 {
            return Err(SourceError::config("ITS_RETRY_ATTEMPTS must be at least 1"));
        }
        if self.max_in_flight == 0 {
            return Err(SourceError::config("ITS_MAX_IN_FLIGHT must be at least 1"));
        }

        if self.mode == SourceMode::Remote {
            if self.fetch_base_url.as_deref().unwrap_or("").is_empty() {
                return Err(SourceError::config(
                    "remote mode requires ITS_FETCH_BASE_URL",
                ));
            }
            if self.credential_base_url.as_deref().unwrap_or("").is_empty() {
                return Err(SourceError::config(
                    "remote mode requires ITS_CREDENTIAL_BASE_URL",
                ));
            }
            if self.api_key.as_deref().unwrap_or("").is_empty() {
                return Err(SourceError::config("remote mode requires ITS_API_KEY"));
            }
        }

        Ok(())
    }
}

/// Parses a boolean environment variable ("1"/"true"/"yes" are true).
fn env_bool(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parses a numeric environment variable, ignoring malformed values.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
