//! Unity Editor Bridge
//!
//! Lets an external tool-calling client drive a running Unity Editor over
//! framed TCP, riding out slow accepts, heartbeat chatter, and script
//! reloads.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 UNITY BRIDGE                  │
//!                      │                                               │
//!   Client Request     │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ──────────────────▶│  │ server │──▶│resilience│──▶│ net::editor │──┼──▶ Unity
//!                      │  │ accept │   │ retries  │   │  exchange   │  │    Editor
//!   Client Response    │  │ + sess │◀──│ + pacing │◀──│  + frames   │◀─┼───
//!   ◀──────────────────│  └────────┘   └─────────┘   └─────────────┘  │
//!                      │                                               │
//!                      │  ┌─────────────────────────────────────────┐  │
//!                      │  │          Cross-Cutting Concerns          │  │
//!                      │  │  config · observability · lifecycle      │  │
//!                      │  └─────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::net::TcpListener;

use unity_bridge::config;
use unity_bridge::lifecycle::{signals, Shutdown};
use unity_bridge::observability::logging;
use unity_bridge::server::BridgeServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config::Loaded { config, defaulted } = config::load();
    logging::init_logging(&config.logging);

    tracing::info!("unity-bridge v0.1.0 starting");
    for field in &defaulted {
        tracing::warn!(field = %field, "Malformed environment value ignored, using default");
    }

    tracing::info!(
        editor = %config.network.editor_addr(),
        listen_port = config.network.mcp_port,
        connect_timeout_secs = config.connection.connect_timeout_secs,
        framed_receive_timeout_secs = config.connection.framed_receive_timeout_secs,
        max_retries = config.retry.max_retries,
        reload_max_retries = config.retry.reload_max_retries,
        telemetry_enabled = config.telemetry.enabled,
        "Configuration loaded"
    );

    // Advisory only; binding the real listener below is the hard check.
    if let Err(errors) = config::validate_config(&config) {
        for issue in &errors {
            tracing::warn!(issue = %issue, "Configuration check failed");
        }
    }

    let listener = TcpListener::bind(config.network.listen_addr()).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = BridgeServer::new(Arc::new(config));
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
