// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Entry point for inbound message events.
//!
//! `handle` filters out events the guard must ignore, records the rest in
//! the window store and hands any resulting action to the executor on a
//! spawned task, so the caller never waits for relay calls or the warn
//! delay.

use crate::config::GuardConfig;
use crate::error::{ConfigError, RelayError, Result};
use crate::event::{ActivityEvent, ChannelId};
use crate::executor::{ActionExecutor, ActionReport};
use crate::metrics::GuardMetrics;
use crate::policy::Action;
use crate::relay::Relay;
use crate::window::WindowStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The guard is switched off
    Disabled,
    /// Authored by a bot account
    Bot,
    /// Authored by this bot
    SelfAuthored,
    /// Posted in an excluded channel
    ExcludedChannel,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Bot => "bot",
            Self::SelfAuthored => "self",
            Self::ExcludedChannel => "excluded",
        }
    }
}

/// Result of handling one event.
#[derive(Debug)]
pub enum IngestOutcome {
    Skipped(SkipReason),
    Evaluated {
        action: Action,
        /// Events in the window after this one was recorded
        count: usize,
        /// Spawned warn/purge work, if the action has side effects
        task: Option<JoinHandle<ActionReport>>,
    },
}

impl IngestOutcome {
    /// Action decided, or `None` for skipped events.
    pub fn action(&self) -> Option<Action> {
        match self {
            Self::Skipped(_) => None,
            Self::Evaluated { action, .. } => Some(*action),
        }
    }

    /// Wait for the spawned action, if any.
    pub async fn finish(self) -> Option<ActionReport> {
        match self {
            Self::Evaluated {
                task: Some(task), ..
            } => task.await.ok(),
            _ => None,
        }
    }
}

/// The spam guard.
pub struct Ingest {
    config: RwLock<Arc<GuardConfig>>,
    store: Arc<WindowStore>,
    executor: Arc<ActionExecutor>,
    clock: Arc<dyn Clock>,
    metrics: GuardMetrics,
}

impl Ingest {
    /// Build a guard for a validated `config`. Each relay call is bounded
    /// by `call_timeout`.
    pub fn new(config: GuardConfig, relay: Arc<dyn Relay>, call_timeout: Duration) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(WindowStore::new());
        let metrics = GuardMetrics::new()?;
        let executor = Arc::new(ActionExecutor::new(
            relay,
            store.clone(),
            metrics.clone(),
            call_timeout,
        ));

        Ok(Self {
            config: RwLock::new(Arc::new(config)),
            store,
            executor,
            clock: Arc::new(SystemClock),
            metrics,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Configuration currently in force.
    pub fn config(&self) -> Arc<GuardConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new configuration. An invalid one is refused and the
    /// current configuration stays in force.
    pub fn reload(&self, config: GuardConfig) -> std::result::Result<(), ConfigError> {
        config.validate()?;
        info!(
            time_window = config.time_window,
            message_limit = config.message_limit,
            excluded_channels = config.excluded_channels.len(),
            "Spam guard configuration reloaded"
        );
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
        Ok(())
    }

    pub fn store(&self) -> &Arc<WindowStore> {
        &self.store
    }

    pub fn metrics(&self) -> &GuardMetrics {
        &self.metrics
    }

    fn skip_reason(config: &GuardConfig, event: &ActivityEvent) -> Option<SkipReason> {
        if !config.enabled {
            Some(SkipReason::Disabled)
        } else if config.self_id == Some(event.identity_id.0) {
            Some(SkipReason::SelfAuthored)
        } else if event.author_is_bot {
            Some(SkipReason::Bot)
        } else if config.is_excluded(event.channel_id) {
            Some(SkipReason::ExcludedChannel)
        } else {
            None
        }
    }

    /// Process one created message.
    ///
    /// Must be called from within a Tokio runtime: warn and purge work is
    /// spawned onto it.
    pub fn handle(&self, event: ActivityEvent) -> IngestOutcome {
        let config = self.config();

        if let Some(reason) = Self::skip_reason(&config, &event) {
            debug!(
                identity = %event.identity_id,
                channel = %event.channel_id,
                reason = reason.as_str(),
                "Event ignored"
            );
            self.metrics.events.with_label_values(&[reason.as_str()]).inc();
            return IngestOutcome::Skipped(reason);
        }
        self.metrics.events.with_label_values(&["counted"]).inc();

        let channel = event.channel_id;
        let decision = self.store.touch_and_evaluate(
            event,
            self.clock.now(),
            config.window(),
            config.message_limit,
        );
        let action = decision.action;
        let count = decision.snapshot.count;
        self.metrics.actions.with_label_values(&[action.as_str()]).inc();
        self.metrics.tracked_identities.set(self.store.len() as i64);

        debug!(
            identity = %decision.snapshot.identity,
            %channel,
            count,
            %action,
            "Window evaluated"
        );

        let task = action.purges().then(|| {
            let executor = self.executor.clone();
            tokio::spawn(async move { executor.execute(decision, channel, &config).await })
        });

        IngestOutcome::Evaluated {
            action,
            count,
            task,
        }
    }

    /// Post a plain reply into `channel`, bounded like every relay call.
    pub async fn reply(&self, channel: ChannelId, text: &str) -> std::result::Result<(), RelayError> {
        self.executor.notify(channel, text).await
    }

    /// Evict idle windows. Returns the number of evicted identities.
    pub fn sweep(&self) -> usize {
        let config = self.config();
        let evicted = self.store.sweep(self.clock.now(), config.window());
        self.metrics.tracked_identities.set(self.store.len() as i64);
        evicted
    }

    /// Sweep forever. The interval is read from the configuration in force
    /// before every pause, so a reload takes effect after the current one.
    pub async fn run_sweeper(&self) {
        loop {
            tokio::time::sleep(self.config().sweep_interval()).await;
            self.sweep();
        }
    }
}
