// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the spam guard.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Counters and gauges exported on the metrics endpoint.
#[derive(Clone)]
pub struct GuardMetrics {
    registry: Registry,
    /// Inbound events by outcome (counted, excluded, bot, self, disabled)
    pub events: IntCounterVec,
    /// Policy decisions by action
    pub actions: IntCounterVec,
    /// Relay calls by operation and result
    pub relay_calls: IntCounterVec,
    /// Identities with a live window
    pub tracked_identities: IntGauge,
}

impl GuardMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("spam_guard".to_string()), None)?;

        let events = IntCounterVec::new(
            Opts::new("events_total", "Inbound message events by outcome"),
            &["outcome"],
        )?;
        let actions = IntCounterVec::new(
            Opts::new("actions_total", "Policy decisions by action"),
            &["action"],
        )?;
        let relay_calls = IntCounterVec::new(
            Opts::new("relay_calls_total", "Relay calls by operation and result"),
            &["op", "result"],
        )?;
        let tracked_identities =
            IntGauge::new("tracked_identities", "Identities with a live window")?;

        registry.register(Box::new(events.clone()))?;
        registry.register(Box::new(actions.clone()))?;
        registry.register(Box::new(relay_calls.clone()))?;
        registry.register(Box::new(tracked_identities.clone()))?;

        Ok(Self {
            registry,
            events,
            actions,
            relay_calls,
            tracked_identities,
        })
    }

    pub fn record_relay(&self, op: &str, ok: bool) {
        self.relay_calls
            .with_label_values(&[op, if ok { "ok" } else { "error" }])
            .inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for GuardMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardMetrics")
            .field("tracked_identities", &self.tracked_identities.get())
            .finish_non_exhaustive()
    }
}
