// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the spam guard service.
//!
//! The `guard` section keeps the key names of the bot's `AntiSpam.json`
//! (`excluded_channels`, `time_window`, `message_limit`), so an existing
//! file deserializes unchanged.

use crate::error::{ConfigError, GuardError};
use crate::event::ChannelId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Upper bound on `time_window` (one week).
pub const MAX_TIME_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for the spam guard service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Spam window and policy configuration
    #[serde(default)]
    pub guard: GuardConfig,

    /// Outbound relay configuration
    #[serde(default)]
    pub relay: RelayConfig,

    /// Static command responses
    #[serde(default)]
    pub commands: CommandConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding window and policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Run the spam guard at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Channels whose messages are never counted
    #[serde(default)]
    pub excluded_channels: HashSet<ChannelId>,

    /// Window length in seconds (default: 10)
    #[serde(default = "default_time_window")]
    pub time_window: u64,

    /// Messages allowed per window before the guard acts (default: 5)
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,

    /// Pause between the warning and the purge in milliseconds (default: 1000)
    #[serde(default = "default_warn_delay_ms")]
    pub warn_delay_ms: u64,

    /// Warning text; `{user}` is replaced by the offender's id
    #[serde(default = "default_warning_template")]
    pub warning_template: String,

    /// Skip a pending purge when its episode ended during the warn delay
    /// (default: false)
    #[serde(default)]
    pub cancel_stale_purge: bool,

    /// Interval of the idle-window sweep in seconds (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// User id of the bot itself; its own messages are ignored
    #[serde(default)]
    pub self_id: Option<u64>,
}

/// Relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the platform gateway. Without it actions are only logged.
    #[serde(default)]
    pub url: Option<String>,

    /// Timeout of a single relay call in milliseconds (default: 5000)
    #[serde(default = "default_relay_timeout_ms")]
    pub timeout_ms: u64,
}

/// One static command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStrip {
    pub command: String,
    pub response: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Static command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Command prefix (default: "!")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub strips: Vec<CommandStrip>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_time_window() -> u64 {
    10
}

fn default_message_limit() -> usize {
    5
}

fn default_warn_delay_ms() -> u64 {
    1000
}

fn default_warning_template() -> String {
    "<@{user}>, please stop spamming!".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_relay_timeout_ms() -> u64 {
    5000
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            guard: GuardConfig::default(),
            relay: RelayConfig::default(),
            commands: CommandConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            excluded_channels: HashSet::new(),
            time_window: default_time_window(),
            message_limit: default_message_limit(),
            warn_delay_ms: default_warn_delay_ms(),
            warning_template: default_warning_template(),
            cancel_stale_purge: false,
            sweep_interval_secs: default_sweep_interval_secs(),
            self_id: None,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: default_relay_timeout_ms(),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            strips: Vec::new(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl GuardConfig {
    /// Reject values the guard cannot evaluate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_window == 0 {
            return Err(ConfigError::ZeroTimeWindow);
        }
        if self.time_window > MAX_TIME_WINDOW_SECS {
            return Err(ConfigError::TimeWindowTooLarge(self.time_window));
        }
        if self.message_limit == 0 {
            return Err(ConfigError::ZeroMessageLimit);
        }
        Ok(())
    }

    /// Window length. Only meaningful on a validated config.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.time_window.min(MAX_TIME_WINDOW_SECS) as i64)
    }

    /// Get the warn delay
    pub fn warn_delay(&self) -> Duration {
        Duration::from_millis(self.warn_delay_ms)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn is_excluded(&self, channel: ChannelId) -> bool {
        self.excluded_channels.contains(&channel)
    }
}

impl RelayConfig {
    /// Get the per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            url::Url::parse(url).map_err(|e| ConfigError::InvalidRelayUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

impl Config {
    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GuardError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// - `BIND_ADDR`
    /// - `TIME_WINDOW`: window in seconds
    /// - `MESSAGE_LIMIT`
    /// - `EXCLUDED_CHANNELS`: comma-separated channel ids
    /// - `WARN_DELAY_MS`
    /// - `RELAY_URL`
    /// - `COMMAND_PREFIX`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(v) = lookup("TIME_WINDOW") {
            self.guard.time_window = parse_env("TIME_WINDOW", &v)?;
        }
        if let Some(v) = lookup("MESSAGE_LIMIT") {
            self.guard.message_limit = parse_env("MESSAGE_LIMIT", &v)?;
        }
        if let Some(v) = lookup("EXCLUDED_CHANNELS") {
            self.guard.excluded_channels = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_env("EXCLUDED_CHANNELS", s).map(ChannelId))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = lookup("WARN_DELAY_MS") {
            self.guard.warn_delay_ms = parse_env("WARN_DELAY_MS", &v)?;
        }
        if let Some(url) = lookup("RELAY_URL") {
            self.relay.url = Some(url);
        }
        if let Some(prefix) = lookup("COMMAND_PREFIX") {
            self.commands.prefix = prefix;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.guard.validate()?;
        self.relay.validate()
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}
