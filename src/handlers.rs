// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the spam guard service.
//!
//! The platform gateway posts every created message to `/events`; the
//! guard answers with its decision and performs any warn/purge work in
//! the background through the relay.

use crate::commands::CommandResponder;
use crate::config::{Config, GuardConfig};
use crate::event::ActivityEvent;
use crate::ingest::{Ingest, IngestOutcome, SkipReason};
use crate::policy::Action;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Shared application state.
pub struct AppState {
    pub ingest: Ingest,
    pub commands: CommandResponder,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub tracked_identities: usize,
}

/// Decision returned for a posted event.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub counted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub command_answered: bool,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/events", post(events))
        .route("/config/guard", get(guard_config).put(reload_guard));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "spam-guard",
        version: env!("CARGO_PKG_VERSION"),
        tracked_identities: state.ingest.store().len(),
    })
}

/// Accept one created message from the gateway.
pub async fn events(
    State(state): State<Arc<AppState>>,
    Json(event): Json<ActivityEvent>,
) -> Json<EventResponse> {
    debug!(
        identity = %event.identity_id,
        channel = %event.channel_id,
        handle = %event.handle,
        "Processing message event"
    );

    let reply = state.commands.respond(&event).map(str::to_owned);
    let channel = event.channel_id;

    let mut response = match state.ingest.handle(event) {
        IngestOutcome::Skipped(reason) => EventResponse {
            counted: false,
            skipped: Some(reason),
            action: None,
            count: None,
            command_answered: false,
        },
        // The spawned action task runs on; its report only goes to the logs.
        IngestOutcome::Evaluated { action, count, .. } => EventResponse {
            counted: true,
            skipped: None,
            action: Some(action),
            count: Some(count),
            command_answered: false,
        },
    };

    // Purged messages get no answer.
    let purged = response.action.is_some_and(Action::purges);
    if let (Some(text), false) = (reply, purged) {
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = state.ingest.reply(channel, &text).await {
                warn!(%channel, error = %e, "Failed to answer command");
            }
        });
        response.command_answered = true;
    }

    Json(response)
}

/// Guard configuration currently in force.
pub async fn guard_config(State(state): State<Arc<AppState>>) -> Json<GuardConfig> {
    Json(state.ingest.config().as_ref().clone())
}

/// Replace the guard configuration. Invalid values are refused with 422
/// and the running configuration is kept.
pub async fn reload_guard(
    State(state): State<Arc<AppState>>,
    Json(config): Json<GuardConfig>,
) -> Response {
    match state.ingest.reload(config) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!(error = %e, "Rejected guard configuration");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.ingest.metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
