// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for flood simulation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use spam_guard::{ActivityEvent, ChannelId, UserId};

/// Fixed start of simulated time.
pub fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Simulated time `millis` after the epoch.
pub fn at_millis(millis: i64) -> DateTime<Utc> {
    epoch() + Duration::milliseconds(millis)
}

/// Simulated time `secs` after the epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    at_millis(secs * 1000)
}

/// A message by `user` in `channel` posted `secs` after the epoch.
pub fn message(user: u64, channel: u64, message_id: u64, secs: i64) -> ActivityEvent {
    ActivityEvent::new(UserId(user), ChannelId(channel), message_id, at(secs))
        .with_content(format!("message {message_id}"))
}

/// A pool of distinct user ids.
pub fn generate_users(count: usize) -> Vec<UserId> {
    (0..count as u64).map(|i| UserId(100_000 + i)).collect()
}

/// A pool of distinct channel ids.
pub fn generate_channels(count: usize) -> Vec<ChannelId> {
    (0..count as u64).map(|i| ChannelId(500 + i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_users() {
        let users = generate_users(256);
        let unique: std::collections::HashSet<_> = users.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_message_timestamps() {
        assert_eq!(message(1, 2, 3, 5).timestamp - epoch(), Duration::seconds(5));
    }
}
