// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Activity events delivered by the chat platform gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the actor whose activity is rate-limited (platform user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a posted message, sufficient for the relay to delete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub channel_id: ChannelId,
    pub message_id: u64,
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.message_id)
    }
}

/// One created message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub identity_id: UserId,
    pub channel_id: ChannelId,
    pub timestamp: DateTime<Utc>,
    pub handle: MessageHandle,
    #[serde(default)]
    pub content: Option<String>,
    /// Set by the gateway when the author is a bot account
    #[serde(default)]
    pub author_is_bot: bool,
}

impl ActivityEvent {
    /// Build a human-authored event whose handle lives in `channel_id`.
    pub fn new(
        identity_id: UserId,
        channel_id: ChannelId,
        message_id: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            identity_id,
            channel_id,
            timestamp,
            handle: MessageHandle {
                channel_id,
                message_id,
            },
            content: None,
            author_is_bot: false,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn from_bot(mut self) -> Self {
        self.author_is_bot = true;
        self
    }
}
