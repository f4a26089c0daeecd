// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound calls to the chat platform.
//!
//! The guard only ever needs two operations: post a text into a channel
//! and delete a message. Both are single best-effort attempts.

use crate::error::RelayError;
use crate::event::{ChannelId, MessageHandle};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::info;

/// Messaging platform collaborator.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Post `text` into `channel`.
    async fn notify(&self, channel: ChannelId, text: &str) -> Result<(), RelayError>;

    /// Delete the message behind `handle`.
    async fn delete(&self, handle: &MessageHandle) -> Result<(), RelayError>;
}

#[derive(Debug, Serialize)]
struct NotifyRequest<'a> {
    channel_id: ChannelId,
    text: &'a str,
}

/// Relay that forwards calls as JSON to the platform gateway.
///
/// - `POST {base}/notify` with `{"channel_id", "text"}`
/// - `POST {base}/delete` with `{"channel_id", "message_id"}`
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T, subject: String) -> Result<(), RelayError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Err(RelayError::Forbidden(subject)),
            StatusCode::NOT_FOUND => Err(RelayError::NotFound(subject)),
            status => Err(RelayError::Transport(format!("{path} returned {status}"))),
        }
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn notify(&self, channel: ChannelId, text: &str) -> Result<(), RelayError> {
        let body = NotifyRequest {
            channel_id: channel,
            text,
        };
        self.post("notify", &body, format!("channel {channel}")).await
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), RelayError> {
        self.post("delete", handle, format!("message {handle}")).await
    }
}

/// Relay that only logs what it would have done.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRelay;

#[async_trait]
impl Relay for LogRelay {
    async fn notify(&self, channel: ChannelId, text: &str) -> Result<(), RelayError> {
        info!(%channel, text, "Would notify channel");
        Ok(())
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), RelayError> {
        info!(%handle, "Would delete message");
        Ok(())
    }
}
