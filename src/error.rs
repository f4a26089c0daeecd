// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the spam guard

use thiserror::Error;

/// Rejected configuration. The guard refuses to run with it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("time_window must be greater than zero")]
    ZeroTimeWindow,

    #[error("time_window of {0}s exceeds the maximum of {max}s", max = crate::config::MAX_TIME_WINDOW_SECS)]
    TimeWindowTooLarge(u64),

    #[error("message_limit must be at least 1")]
    ZeroMessageLimit,

    #[error("Invalid relay URL {url}: {reason}")]
    InvalidRelayUrl { url: String, reason: String },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Failure of a single notify or delete call against the relay.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("Missing permission for {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Relay call timed out after {0} ms")]
    Timeout(u64),

    #[error("Relay transport error: {0}")]
    Transport(String),
}

/// Application error types
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read configuration file: {0}")]
    ConfigFile(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GuardError>;
