// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Static text commands.

use crate::config::{CommandConfig, CommandStrip};
use crate::event::ActivityEvent;

/// Matches message content against the configured commands.
#[derive(Debug, Clone)]
pub struct CommandResponder {
    prefix: String,
    strips: Vec<CommandStrip>,
}

impl CommandResponder {
    pub fn new(config: &CommandConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            strips: config.strips.iter().filter(|s| s.enabled).cloned().collect(),
        }
    }

    /// Response of the first enabled command the message starts with.
    pub fn respond(&self, event: &ActivityEvent) -> Option<&str> {
        if event.author_is_bot {
            return None;
        }
        let content = event.content.as_deref()?;
        let rest = content.strip_prefix(self.prefix.as_str())?;
        self.strips
            .iter()
            .find(|s| rest.starts_with(s.command.as_str()))
            .map(|s| s.response.as_str())
    }
}
