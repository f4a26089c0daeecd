// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Spam Guard
//!
//! This crate rate-limits chat activity per user with a sliding time
//! window:
//!
//! - Per-user window of recent messages, trimmed on every touch
//! - One warning per spam episode, re-armed once the user calms down
//! - Best-effort purge of the buffered messages while over the limit
//! - Excluded channels, bot and self-authored messages are never counted
//! - Periodic eviction of idle windows

pub mod commands;
pub mod config;
pub mod error;
pub mod event;
pub mod executor;
pub mod handlers;
pub mod ingest;
pub mod metrics;
pub mod policy;
pub mod relay;
pub mod window;

pub use config::{Config, GuardConfig};
pub use error::{ConfigError, GuardError, RelayError};
pub use event::{ActivityEvent, ChannelId, MessageHandle, UserId};
pub use executor::{ActionExecutor, ActionReport};
pub use ingest::{Clock, Ingest, IngestOutcome, ManualClock, SkipReason, SystemClock};
pub use policy::{evaluate, Action};
pub use relay::{HttpRelay, LogRelay, Relay};
pub use window::{Decision, PurgeGate, WindowSnapshot, WindowStore};
