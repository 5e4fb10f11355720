//! Configuration management for the roombook client.
//!
//! Loads configuration from environment variables with sensible defaults.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be used
    #[error("Invalid value for {key}: {value} ({reason})")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Rejected value
        value: String,
        /// What was expected
        reason: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend configuration
    pub api: ApiConfig,
    /// Local persistence
    pub storage: StorageConfig,
    /// Local calendar
    pub locale: LocaleConfig,
}

/// Backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8080/api`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Local persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the session and the edit draft
    pub state_file: PathBuf,
}

/// Local calendar configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Offset of local time from UTC in minutes ("today", slot start hours)
    pub utc_offset_minutes: i32,
}

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not
    /// parse or the UTC offset is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout_secs = match lookup("ROOMBOOK_REQUEST_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    key: "ROOMBOOK_REQUEST_TIMEOUT_SECS",
                    value,
                    reason: "expected a positive number of seconds",
                })?,
            None => 10,
        };

        let utc_offset_minutes = match lookup("ROOMBOOK_UTC_OFFSET_MINUTES") {
            Some(value) => value
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|minutes| minutes.unsigned_abs() < MAX_OFFSET_MINUTES.unsigned_abs())
                .ok_or(ConfigError::Invalid {
                    key: "ROOMBOOK_UTC_OFFSET_MINUTES",
                    value,
                    reason: "expected minutes east of UTC, within 18 hours",
                })?,
            None => 0,
        };

        Ok(Self {
            api: ApiConfig {
                base_url: lookup("ROOMBOOK_API_URL")
                    .unwrap_or_else(|| "http://localhost:8080/api".to_string()),
                request_timeout_secs,
            },
            storage: StorageConfig {
                state_file: lookup("ROOMBOOK_STATE_FILE")
                    .map_or_else(|| PathBuf::from(".roombook/state.json"), PathBuf::from),
            },
            locale: LocaleConfig { utc_offset_minutes },
        })
    }

    /// Per-request HTTP timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Local offset used for "today" and slot start times
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.locale.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}
