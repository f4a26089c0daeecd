// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Spam Guard Service
//!
//! Receives every created chat message from the platform gateway, keeps a
//! sliding window per user and, once a user posts more than
//! `message_limit` messages within `time_window` seconds, warns them once
//! and deletes their buffered messages.
//!
//! ## Configuration
//!
//! An optional JSON file named by `SPAM_GUARD_CONFIG` is read first, then
//! environment variables override it:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `TIME_WINDOW`: Window length in seconds (default: 10)
//! - `MESSAGE_LIMIT`: Messages allowed per window (default: 5)
//! - `EXCLUDED_CHANNELS`: Comma-separated channel ids never counted
//! - `WARN_DELAY_MS`: Pause between warning and purge (default: 1000)
//! - `RELAY_URL`: Gateway base URL; without it actions are only logged
//! - `COMMAND_PREFIX`: Prefix of static commands (default: !)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spam_guard::{
    commands::CommandResponder,
    config::Config,
    handlers::{router, AppState},
    ingest::Ingest,
    relay::{HttpRelay, LogRelay, Relay},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    info!(
        bind_addr = %config.bind_addr,
        time_window = config.guard.time_window,
        message_limit = config.guard.message_limit,
        excluded_channels = config.guard.excluded_channels.len(),
        relay = config.relay.url.as_deref().unwrap_or("log-only"),
        "Starting spam guard"
    );

    let relay: Arc<dyn Relay> = match &config.relay.url {
        Some(url) => Arc::new(HttpRelay::new(url.clone())),
        None => Arc::new(LogRelay),
    };

    // Create application state
    let ingest = Ingest::new(config.guard.clone(), relay, config.relay.timeout())?;
    let commands = CommandResponder::new(&config.commands);

    let state = Arc::new(AppState {
        ingest,
        commands,
        config: config.clone(),
    });

    // Spawn sweep task
    let sweep_state = state.clone();
    tokio::spawn(async move { sweep_state.ingest.run_sweeper().await });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from the optional file and the environment.
fn load_config() -> anyhow::Result<Config> {
    let mut config = match std::env::var("SPAM_GUARD_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
