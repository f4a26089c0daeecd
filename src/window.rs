// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-identity sliding window of recent messages.
//!
//! Each identity owns an ordered buffer of its recent events plus the
//! warning flag of the current spam episode. Buffers live in a sharded
//! concurrent map: touches for one identity are serialised by the entry
//! lock, touches for different identities only meet on a shard lock held
//! for a few synchronous operations.

use crate::event::{ActivityEvent, UserId};
use crate::policy::{self, Action};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::debug;

/// Read-only view of an identity's window after a touch.
#[derive(Debug, Clone)]
pub struct WindowSnapshot {
    pub identity: UserId,
    /// Number of buffered events
    pub count: usize,
    /// Buffered events, oldest first
    pub events: Vec<ActivityEvent>,
    /// Whether the current episode has already been warned
    pub warning_sent: bool,
    /// Episode the snapshot belongs to
    pub episode: u64,
}

/// Holds the purges of one episode behind its warning.
///
/// The `WarnAndPurge` decision gets the sending half and opens it once the
/// warning is posted and the warn delay has passed. Every `PurgeOnly` of the
/// same episode waits on a receiver. A dropped sender also opens the gate.
#[derive(Debug)]
pub enum PurgeGate {
    Opens(watch::Sender<bool>),
    Waits(watch::Receiver<bool>),
}

impl PurgeGate {
    /// Wait until the episode's warning allows purging.
    pub async fn wait(self) {
        if let PurgeGate::Waits(mut held) = self {
            // Err means the warning task is gone; nothing left to wait for.
            let _ = held.wait_for(|open| *open).await;
        }
    }

    /// Let every purge of the episode through.
    pub fn open(self) {
        if let PurgeGate::Opens(release) = self {
            release.send_replace(true);
        }
    }
}

/// Outcome of an atomic touch-and-evaluate.
#[derive(Debug)]
pub struct Decision {
    pub snapshot: WindowSnapshot,
    pub action: Action,
    /// Ordering of this decision's purge against the episode's warning
    pub gate: Option<PurgeGate>,
}

#[derive(Debug)]
struct WindowState {
    events: VecDeque<ActivityEvent>,
    warning_sent: bool,
    /// Unique per warning episode; replaced whenever an episode ends
    episode: u64,
    gate: Option<watch::Receiver<bool>>,
}

impl WindowState {
    fn new(episode: u64) -> Self {
        Self {
            events: VecDeque::new(),
            warning_sent: false,
            episode,
            gate: None,
        }
    }

    fn end_episode(&mut self, episode: u64) {
        self.warning_sent = false;
        self.gate = None;
        self.episode = episode;
    }

    /// Insert keeping ascending timestamp order. Arrival order is nearly
    /// always timestamp order, so the scan from the back stops immediately.
    fn insert(&mut self, event: ActivityEvent) {
        let pos = self
            .events
            .iter()
            .rposition(|e| e.timestamp <= event.timestamp)
            .map_or(0, |i| i + 1);
        self.events.insert(pos, event);
    }

    /// Drop the expired prefix. Returns the number of removed events.
    fn trim(&mut self, now: DateTime<Utc>, window: Duration) -> usize {
        let mut removed = 0;
        while let Some(front) = self.events.front() {
            if now - front.timestamp <= window {
                break;
            }
            self.events.pop_front();
            removed += 1;
        }
        removed
    }

    fn snapshot(&self, identity: UserId) -> WindowSnapshot {
        WindowSnapshot {
            identity,
            count: self.events.len(),
            events: self.events.iter().cloned().collect(),
            warning_sent: self.warning_sent,
            episode: self.episode,
        }
    }
}

/// Concurrent store of all identities' windows.
#[derive(Debug, Default)]
pub struct WindowStore {
    windows: DashMap<UserId, WindowState>,
    episodes: AtomicU64,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_episode(&self) -> u64 {
        self.episodes.fetch_add(1, Ordering::Relaxed)
    }

    /// Trim `state` and, if it emptied, fully reset it.
    fn refresh(&self, identity: UserId, state: &mut WindowState, now: DateTime<Utc>, window: Duration) {
        let removed = state.trim(now, window);
        if removed > 0 {
            debug!(%identity, removed, remaining = state.events.len(), "Trimmed expired events");
        }
        if state.events.is_empty() {
            // Release the buffer so a quiet identity costs only its map slot.
            state.events = VecDeque::new();
            if state.warning_sent {
                state.end_episode(self.next_episode());
            }
        }
    }

    /// Events stamped ahead of `now` are recorded at `now`, so a skewed or
    /// forged timestamp cannot keep a window alive.
    fn clamp(event: &mut ActivityEvent, now: DateTime<Utc>) {
        if event.timestamp > now {
            debug!(
                identity = %event.identity_id,
                ahead_ms = (event.timestamp - now).num_milliseconds(),
                "Clamped future event timestamp"
            );
            event.timestamp = now;
        }
    }

    /// Append `event` to its identity's window and trim everything older
    /// than `window` relative to `now`.
    ///
    /// This does not apply the spam policy; see [`touch_and_evaluate`].
    ///
    /// [`touch_and_evaluate`]: WindowStore::touch_and_evaluate
    pub fn touch(&self, mut event: ActivityEvent, now: DateTime<Utc>, window: Duration) -> WindowSnapshot {
        Self::clamp(&mut event, now);
        let identity = event.identity_id;
        let mut entry = self
            .windows
            .entry(identity)
            .or_insert_with(|| WindowState::new(self.next_episode()));
        let state = entry.value_mut();

        state.insert(event);
        self.refresh(identity, state, now, window);
        state.snapshot(identity)
    }

    /// Touch, evaluate the policy and apply its warning transition under one
    /// per-identity lock.
    pub fn touch_and_evaluate(
        &self,
        mut event: ActivityEvent,
        now: DateTime<Utc>,
        window: Duration,
        limit: usize,
    ) -> Decision {
        Self::clamp(&mut event, now);
        let identity = event.identity_id;
        let mut entry = self
            .windows
            .entry(identity)
            .or_insert_with(|| WindowState::new(self.next_episode()));
        let state = entry.value_mut();

        state.insert(event);
        self.refresh(identity, state, now, window);

        let action = policy::evaluate(state.events.len(), limit, state.warning_sent);
        let gate = match action {
            Action::WarnAndPurge => {
                let (release, held) = watch::channel(false);
                state.gate = Some(held);
                Some(PurgeGate::Opens(release))
            }
            Action::PurgeOnly => state.gate.clone().map(PurgeGate::Waits),
            Action::Reset => {
                state.end_episode(self.next_episode());
                None
            }
            Action::None => None,
        };
        state.warning_sent = action.warning_after(state.warning_sent);

        Decision {
            snapshot: state.snapshot(identity),
            action,
            gate,
        }
    }

    /// Current snapshot for `identity` without touching it.
    pub fn snapshot(&self, identity: UserId) -> Option<WindowSnapshot> {
        self.windows.get(&identity).map(|state| state.snapshot(identity))
    }

    /// Episode currently open for `identity`, if it is tracked.
    pub fn episode(&self, identity: UserId) -> Option<u64> {
        self.windows.get(&identity).map(|state| state.episode)
    }

    /// Trim every window and evict identities left without events.
    /// Returns the number of evicted identities.
    pub fn sweep(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let before = self.windows.len();
        self.windows.retain(|identity, state| {
            self.refresh(*identity, state, now, window);
            !state.events.is_empty()
        });
        let evicted = before.saturating_sub(self.windows.len());
        if evicted > 0 {
            debug!(evicted, tracked = self.windows.len(), "Evicted idle windows");
        }
        evicted
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
