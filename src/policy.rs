// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Spam policy: maps window occupancy and warning state to an action.
//!
//! | count vs limit | warning sent | action         |
//! |----------------|--------------|----------------|
//! | over           | no           | `WarnAndPurge` |
//! | over           | yes          | `PurgeOnly`    |
//! | at or under    | yes          | `Reset`        |
//! | at or under    | no           | `None`         |

use serde::Serialize;

/// Action decided for one touch of an identity's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Nothing to do
    None,
    /// First over-limit event of an episode: warn, wait, then purge
    WarnAndPurge,
    /// Still over the limit after warning: purge without a new warning
    PurgeOnly,
    /// Back under the limit: end the warning episode
    Reset,
}

impl Action {
    /// Whether this action deletes the buffered events.
    pub fn purges(self) -> bool {
        matches!(self, Self::WarnAndPurge | Self::PurgeOnly)
    }

    /// Value of the identity's `warning_sent` flag after this action.
    pub fn warning_after(self, warning_sent: bool) -> bool {
        match self {
            Self::WarnAndPurge => true,
            Self::Reset => false,
            Self::PurgeOnly | Self::None => warning_sent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::WarnAndPurge => "warn_and_purge",
            Self::PurgeOnly => "purge_only",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide the action for `count` buffered events against `limit`.
pub fn evaluate(count: usize, limit: usize, warning_sent: bool) -> Action {
    match (count > limit, warning_sent) {
        (true, false) => Action::WarnAndPurge,
        (true, true) => Action::PurgeOnly,
        (false, true) => Action::Reset,
        (false, false) => Action::None,
    }
}
