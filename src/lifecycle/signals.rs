//! OS signal handling.
//!
//! # Responsibilities
//! - Translate SIGINT/SIGTERM into the internal shutdown signal
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Signal delivery triggers graceful shutdown; forced exit is left to the
//!   supervisor

use crate::lifecycle::Shutdown;

/// Wait for an interrupt or terminate signal, then trigger shutdown.
pub async fn shutdown_on_signal(shutdown: Shutdown) {
    wait_for_signal().await;
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(error = %err, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
