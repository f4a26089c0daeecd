// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Relay double that records every call.

use async_trait::async_trait;
use spam_guard::{ChannelId, MessageHandle, Relay, RelayError};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One recorded relay call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCall {
    Notify { channel: ChannelId, text: String },
    Delete(MessageHandle),
}

/// Records calls and fails the ones it is told to.
#[derive(Debug, Default)]
pub struct RecordingRelay {
    calls: Mutex<Vec<(Instant, RelayCall)>>,
    fail_notify: bool,
    fail_deletes: HashSet<u64>,
}

impl RecordingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notify call fails with a permission error.
    pub fn forbid_notify(mut self) -> Self {
        self.fail_notify = true;
        self
    }

    /// Deleting these message ids fails with not-found.
    pub fn fail_deletes(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.fail_deletes.extend(ids);
        self
    }

    pub fn calls(&self) -> Vec<RelayCall> {
        self.timed_calls().into_iter().map(|(_, call)| call).collect()
    }

    /// Calls with the instant each one was made.
    pub fn timed_calls(&self) -> Vec<(Instant, RelayCall)> {
        self.calls.lock().unwrap().clone()
    }

    /// Shortest gap between the first warning and any deletion, or `None`
    /// if some deletion came before the first warning.
    pub fn delete_lag_after_warning(&self) -> Option<Duration> {
        let calls = self.timed_calls();
        let warned_at = calls.iter().find_map(|(at, call)| match call {
            RelayCall::Notify { .. } => Some(*at),
            RelayCall::Delete(_) => None,
        })?;
        calls
            .iter()
            .filter(|(_, call)| matches!(call, RelayCall::Delete(_)))
            .map(|(at, _)| at.checked_duration_since(warned_at))
            .try_fold(Duration::MAX, |lag, gap| gap.map(|gap| lag.min(gap)))
    }

    pub fn notifications(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RelayCall::Notify { text, .. } => Some(text),
                RelayCall::Delete(_) => None,
            })
            .collect()
    }

    pub fn deleted_ids(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RelayCall::Delete(handle) => Some(handle.message_id),
                RelayCall::Notify { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Relay for RecordingRelay {
    async fn notify(&self, channel: ChannelId, text: &str) -> Result<(), RelayError> {
        self.calls.lock().unwrap().push((
            Instant::now(),
            RelayCall::Notify {
                channel,
                text: text.to_string(),
            },
        ));
        if self.fail_notify {
            return Err(RelayError::Forbidden(format!("channel {channel}")));
        }
        Ok(())
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), RelayError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), RelayCall::Delete(*handle)));
        if self.fail_deletes.contains(&handle.message_id) {
            return Err(RelayError::NotFound(handle.to_string()));
        }
        Ok(())
    }
}
