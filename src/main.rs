// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use graph_sync::{
    api::router,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::StoragePaths,
};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .init(),
    }
}

/// Cancel `shutdown` once `signal` fires. A failed listener leaves it running.
async fn cancel_on_signal<F>(signal: F, shutdown: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "graph-sync starting");

    let paths = StoragePaths::new(&config.data_dir);
    let state = AppState::open(paths.clone())?;
    let queued_events = state.queue.len()?;
    tracing::info!(
        queue = %paths.queue_db().display(),
        queued_events,
        "Transaction queue opened"
    );

    let app = router(state);
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Feed service listening (docs at /docs)");

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("Feed service stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_cancels_shutdown_token() {
        let token = CancellationToken::new();
        cancel_on_signal(async { Ok(()) }, token.clone()).await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_serving() {
        let token = CancellationToken::new();
        cancel_on_signal(
            async { Err(std::io::Error::other("no signal handler")) },
            token.clone(),
        )
        .await;
        assert!(!token.is_cancelled());
    }
}
