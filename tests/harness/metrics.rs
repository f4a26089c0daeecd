// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for flood simulation results.

use spam_guard::{Action, ActionReport, UserId};
use std::collections::HashMap;

/// Possible outcomes for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ignored,
    Quiet,
    Warned,
    Purged,
    Reset,
}

impl From<Option<Action>> for Outcome {
    fn from(action: Option<Action>) -> Self {
        match action {
            None => Self::Ignored,
            Some(Action::None) => Self::Quiet,
            Some(Action::WarnAndPurge) => Self::Warned,
            Some(Action::PurgeOnly) => Self::Purged,
            Some(Action::Reset) => Self::Reset,
        }
    }
}

/// Collects metrics during a flood simulation.
#[derive(Debug, Default)]
pub struct FloodMetrics {
    outcomes: HashMap<Outcome, usize>,
    warnings_per_user: HashMap<UserId, usize>,
    deletions_attempted: usize,
    deletions_failed: usize,
    stale_skipped: usize,
}

impl FloodMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the decision for one message.
    pub fn record(&mut self, outcome: Outcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Record a finished action.
    pub fn record_report(&mut self, report: &ActionReport) {
        if report.warned.is_some() {
            *self.warnings_per_user.entry(report.identity).or_insert(0) += 1;
        }
        self.deletions_attempted += report.attempted();
        self.deletions_failed += report.failed;
        if report.skipped_stale {
            self.stale_skipped += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Warning episodes per user.
    pub fn warnings_for(&self, user: UserId) -> usize {
        self.warnings_per_user.get(&user).copied().unwrap_or(0)
    }

    pub fn warned_users(&self) -> usize {
        self.warnings_per_user.len()
    }

    pub fn deletions_attempted(&self) -> usize {
        self.deletions_attempted
    }

    pub fn deletions_failed(&self) -> usize {
        self.deletions_failed
    }

    pub fn stale_skipped(&self) -> usize {
        self.stale_skipped
    }
}

impl std::fmt::Display for FloodMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Flood Report ===")?;
        writeln!(f, "Messages:          {}", self.total())?;
        writeln!(f, "Ignored:           {}", self.count(Outcome::Ignored))?;
        writeln!(f, "Quiet:             {}", self.count(Outcome::Quiet))?;
        writeln!(f, "Warned:            {}", self.count(Outcome::Warned))?;
        writeln!(f, "Purged:            {}", self.count(Outcome::Purged))?;
        writeln!(f, "Reset:             {}", self.count(Outcome::Reset))?;
        writeln!(f, "Warned users:      {}", self.warned_users())?;
        writeln!(f, "Delete attempts:   {}", self.deletions_attempted)?;
        writeln!(f, "Delete failures:   {}", self.deletions_failed)?;
        Ok(())
    }
}
