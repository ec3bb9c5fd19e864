//! Client configuration layered from defaults and `STOCKROOM_*` variables.
//!
//! Precedence (highest wins):
//! 1. Environment variables, e.g. `STOCKROOM_API_BASE_URL`
//! 2. Built-in defaults
//!
//! [`ClientConfig::load_with_dotenv`] first loads a `.env` file so local
//! development can keep the backend origin out of the shell profile.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Duration;

use crate::api::export_url;

/// Default backend origin for local development.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
/// Quiet period between the last keystroke and the search fetch.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

const fn default_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

const fn default_command_queue_bound() -> usize {
    256
}

const fn default_event_capacity() -> usize {
    1024
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction error.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
    /// `.env` file could not be read.
    #[error("failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    /// A value parsed but makes no sense.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Offending key.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

/// Settings for the HTTP client and the controller runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Origin all REST calls are made against.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Origin used for the CSV export link; falls back to `api_base_url`.
    #[serde(default)]
    pub export_base_url: Option<String>,
    /// Search debounce quiet period in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Per-request timeout; `None` keeps the HTTP client's default.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    /// Bound of the controller command queue.
    #[serde(default = "default_command_queue_bound")]
    pub command_queue_bound: usize,
    /// Capacity of the view event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            export_base_url: None,
            search_debounce_ms: default_debounce_ms(),
            request_timeout_ms: None,
            command_queue_bound: default_command_queue_bound(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ClientConfig {
    /// Loads defaults overlaid with `STOCKROOM_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `.env` from the current directory (if any), then [`Self::load`].
    ///
    /// A missing file is fine; one that exists but cannot be read or parsed
    /// is an error.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(ConfigError::EnvFile(err)),
        }
        Self::load()
    }

    /// Loads the given env file, then [`Self::load`]. Variables already set
    /// in the process environment win over the file.
    pub fn load_with_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Self::load()
    }

    /// Provider chain; public so callers can layer extra providers on top.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed("STOCKROOM_"))
    }

    /// Rejects values that deserialize but cannot drive a client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.command_queue_bound == 0 || self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "command_queue_bound/event_capacity".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Debounce quiet period as a [`Duration`].
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Where "Export CSV" navigates to.
    pub fn export_url(&self) -> String {
        export_url(self.export_base_url.as_deref().unwrap_or(&self.api_base_url))
    }
}
