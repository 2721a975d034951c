//! config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Runtime tuning for the registrar's concurrency machinery: how long a
//! mutator waits for a record lease, how long any lease may be held before
//! force-release, and how often a blocked acquirer polls. Values come from a
//! TOML file or from [`RegistrarConfig::default`].
//!
//! # Example
//!
//! ```toml
//! [lease]
//! acquire_timeout_ms = 10000
//! max_hold_ms = 30000
//! poll_interval_ms = 25
//! ```
//!
//! # Validation
//!
//! Config values are validated after parsing: every duration must be
//! non-zero and the polling interval may not exceed the acquisition timeout.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Top-level registrar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrarConfig {
    /// Lease timing settings.
    pub lease: LeaseSettings,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            lease: LeaseSettings::default(),
        }
    }
}

impl RegistrarConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReadError`] if the file cannot be read
    /// - [`ConfigError::ParseError`] on malformed or unknown fields
    /// - [`ConfigError::InvalidValue`] if a parsed value fails validation
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lease.validate()
    }
}

/// Lease timing settings.
///
/// All durations are milliseconds in the file; accessors return
/// [`Duration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeaseSettings {
    /// How long a mutator waits for a contended lease before failing with
    /// a lock timeout.
    pub acquire_timeout_ms: u64,

    /// Maximum hold duration before a lease is force-released.
    pub max_hold_ms: u64,

    /// Polling interval for blocked acquirers.
    pub poll_interval_ms: u64,
}

impl Default for LeaseSettings {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 10_000,
            max_hold_ms: 30_000,
            poll_interval_ms: 25,
        }
    }
}

impl LeaseSettings {
    /// The acquisition timeout as a [`Duration`].
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// The maximum hold bound as a [`Duration`].
    pub fn max_hold(&self) -> Duration {
        Duration::from_millis(self.max_hold_ms)
    }

    /// The polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.acquire_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "lease.acquire_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_hold_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "lease.max_hold_ms must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "lease.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms > self.acquire_timeout_ms {
            return Err(ConfigError::InvalidValue(format!(
                "lease.poll_interval_ms ({}) exceeds lease.acquire_timeout_ms ({})",
                self.poll_interval_ms, self.acquire_timeout_ms
            )));
        }
        Ok(())
    }
}
