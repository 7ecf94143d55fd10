// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community Events API Server

use anyhow::Context;
use community_events::{config::Config, db::ConnectionProvider, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log filter used when `RUST_LOG` is unset or unparseable.
const DEFAULT_LOG_FILTER: &str = "community_events=debug,info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(port = config.port, "Starting Community Events API");

    // Connect before accepting requests; a store we cannot reach is fatal.
    let connections = ConnectionProvider::new(config.gcp_project_id.clone());
    if let Err(e) = connections.get_connection().await {
        tracing::error!(error = %e, "Database connection failed");
        return Err(e).context("Database connection failed");
    }

    let port = config.port;
    let state = Arc::new(AppState {
        config,
        connections,
    });
    let app = community_events::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// JSON logs, filtered by `RUST_LOG`.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .flatten_event(true),
        )
        .init();
}
