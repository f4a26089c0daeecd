// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Carries out warn and purge actions against the relay.
//!
//! Every relay call is a single attempt bounded by a timeout. A failed
//! warning never prevents the purge, and a failed deletion never stops
//! the remaining deletions. No purge of an episode starts before its
//! warning has been posted and the warn delay has elapsed.

use crate::config::GuardConfig;
use crate::error::RelayError;
use crate::event::{ActivityEvent, ChannelId, UserId};
use crate::metrics::GuardMetrics;
use crate::policy::Action;
use crate::relay::Relay;
use crate::window::{Decision, WindowStore};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What an executed action actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub identity: UserId,
    pub action: Action,
    /// `None` when no warning was due, otherwise whether it was delivered
    pub warned: Option<bool>,
    /// Deletions that succeeded
    pub deleted: usize,
    /// Deletions that failed
    pub failed: usize,
    /// Purge skipped because the episode ended during the warn delay
    pub skipped_stale: bool,
}

impl ActionReport {
    fn new(identity: UserId, action: Action) -> Self {
        Self {
            identity,
            action,
            warned: None,
            deleted: 0,
            failed: 0,
            skipped_stale: false,
        }
    }

    /// Deletions attempted.
    pub fn attempted(&self) -> usize {
        self.deleted + self.failed
    }
}

/// Tally of one purge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeTally {
    pub deleted: usize,
    pub failed: usize,
}

/// Executes policy decisions.
pub struct ActionExecutor {
    relay: Arc<dyn Relay>,
    store: Arc<WindowStore>,
    metrics: GuardMetrics,
    call_timeout: Duration,
}

impl ActionExecutor {
    pub fn new(
        relay: Arc<dyn Relay>,
        store: Arc<WindowStore>,
        metrics: GuardMetrics,
        call_timeout: Duration,
    ) -> Self {
        Self {
            relay,
            store,
            metrics,
            call_timeout,
        }
    }

    async fn bounded<F>(&self, call: F) -> Result<(), RelayError>
    where
        F: Future<Output = Result<(), RelayError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout(self.call_timeout.as_millis() as u64)),
        }
    }

    /// Post `text` into `channel` under the call timeout.
    pub async fn notify(&self, channel: ChannelId, text: &str) -> Result<(), RelayError> {
        let result = self.bounded(self.relay.notify(channel, text)).await;
        self.metrics.record_relay("notify", result.is_ok());
        result
    }

    /// Post the spam warning for `identity` into `channel`.
    /// Returns whether it was delivered; failures are only logged.
    pub async fn warn(&self, identity: UserId, channel: ChannelId, template: &str) -> bool {
        let text = template.replace("{user}", &identity.to_string());
        match self.notify(channel, &text).await {
            Ok(()) => {
                info!(%identity, %channel, "Spam warning sent");
                true
            }
            Err(e) => {
                warn!(%identity, %channel, error = %e, "Failed to send spam warning");
                false
            }
        }
    }

    /// Attempt deletion of every event, regardless of earlier failures.
    pub async fn purge(&self, events: &[ActivityEvent]) -> PurgeTally {
        let mut tally = PurgeTally::default();
        for event in events {
            match self.bounded(self.relay.delete(&event.handle)).await {
                Ok(()) => {
                    self.metrics.record_relay("delete", true);
                    tally.deleted += 1;
                }
                Err(e) => {
                    self.metrics.record_relay("delete", false);
                    debug!(handle = %event.handle, error = %e, "Failed to delete message");
                    tally.failed += 1;
                }
            }
        }
        if tally.failed > 0 {
            warn!(
                deleted = tally.deleted,
                failed = tally.failed,
                "Purge finished with failures"
            );
        }
        tally
    }

    /// Run the side effects of `decision`.
    ///
    /// For `WarnAndPurge` the warning completes and the warn delay elapses
    /// before the first deletion, then the episode's gate opens. A
    /// `PurgeOnly` waits on that gate. Each purge covers the events buffered
    /// when its decision was taken.
    pub async fn execute(&self, decision: Decision, channel: ChannelId, config: &GuardConfig) -> ActionReport {
        let Decision {
            snapshot,
            action,
            gate,
        } = decision;
        let mut report = ActionReport::new(snapshot.identity, action);

        if !action.purges() {
            return report;
        }

        if action == Action::WarnAndPurge {
            report.warned = Some(self.warn(snapshot.identity, channel, &config.warning_template).await);
            tokio::time::sleep(config.warn_delay()).await;
            if let Some(gate) = gate {
                gate.open();
            }
        } else if let Some(gate) = gate {
            gate.wait().await;
        }

        if config.cancel_stale_purge && self.store.episode(snapshot.identity) != Some(snapshot.episode) {
            info!(identity = %snapshot.identity, %action, "Episode ended during warn delay, purge cancelled");
            report.skipped_stale = true;
            return report;
        }

        let tally = self.purge(&snapshot.events).await;
        report.deleted = tally.deleted;
        report.failed = tally.failed;
        info!(
            identity = %snapshot.identity,
            %action,
            deleted = tally.deleted,
            failed = tally.failed,
            "Purged buffered messages"
        );

        report
    }
}
