// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Flood patterns for abuse simulation.

/// Flood pattern configuration.
#[derive(Debug, Clone)]
pub struct FloodConfig {
    /// Total number of messages to send
    pub total_messages: usize,
    /// Simulated milliseconds between consecutive messages
    pub interval_ms: i64,
    /// Number of distinct authors, used round-robin
    pub unique_users: usize,
    /// Number of distinct channels, used round-robin
    pub unique_channels: usize,
    /// Messages are authored by bot accounts
    pub from_bots: bool,
    /// Channels are put on the exclusion list
    pub channels_excluded: bool,
    /// Real milliseconds between the warning and the purge
    pub warn_delay_ms: u64,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            total_messages: 100,
            interval_ms: 100,
            unique_users: 1,
            unique_channels: 1,
            from_bots: false,
            channels_excluded: false,
            warn_delay_ms: 0,
        }
    }
}

/// Predefined flood patterns.
impl FloodConfig {
    /// One user posting ten messages a second.
    pub fn single_user_flood() -> Self {
        Self {
            total_messages: 200,
            interval_ms: 100,
            ..Default::default()
        }
    }

    /// Busy server: many users, each posting rarely.
    pub fn busy_server() -> Self {
        Self {
            total_messages: 500,
            interval_ms: 20,
            unique_users: 100,
            unique_channels: 5,
            ..Default::default()
        }
    }

    /// Flood in a channel the guard must not police.
    pub fn excluded_channel_flood() -> Self {
        Self {
            total_messages: 100,
            interval_ms: 10,
            channels_excluded: true,
            ..Default::default()
        }
    }

    /// Bot account posting at a high rate.
    pub fn bot_flood() -> Self {
        Self {
            total_messages: 100,
            interval_ms: 10,
            from_bots: true,
            ..Default::default()
        }
    }

    /// One user spread across channels, still over the limit.
    pub fn cross_channel_flood() -> Self {
        Self {
            total_messages: 60,
            interval_ms: 200,
            unique_channels: 6,
            ..Default::default()
        }
    }

    /// Single user flood while the warn delay is still running.
    pub fn delayed_flood() -> Self {
        Self {
            total_messages: 40,
            interval_ms: 100,
            warn_delay_ms: 150,
            ..Default::default()
        }
    }

    /// One user posting steadily, below the limit.
    pub fn slow_drip() -> Self {
        Self {
            total_messages: 50,
            interval_ms: 3000,
            ..Default::default()
        }
    }
}
