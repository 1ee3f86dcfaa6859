// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flyshop_server::api::router;
use flyshop_server::config::{ServerConfig, LOG_FORMAT_ENV};
use flyshop_server::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ServerConfig::from_env();
    if config.issuer_domain.is_none() || config.audience.is_none() {
        warn!("issuer domain or audience not configured; protected endpoints will answer 401");
    }

    let state = AppState::from_config(&config);

    // Storage failures degrade role resolution rather than blocking
    // startup, so a missing data dir is a warning, not a crash.
    if let Err(e) = state.store.initialize() {
        warn!(error = %e, data_dir = %config.data_dir.display(), "blob store initialization failed");
    }

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    info!(%addr, "fly shop server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to listen for ctrl-c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
