//! Bridge server.
//!
//! # Data Flow
//! ```text
//! Calling client ──framed TCP──▶ accept loop (mod.rs)
//!     → session.rs (one task per client)
//!     → resilience::RetryPolicy
//!     → net::EditorConnection ──framed TCP──▶ editor
//! ```
//!
//! # Design Decisions
//! - All sessions funnel into one editor connection; exchanges queue there
//! - The accept loop selects on shutdown and stops taking clients first
//! - The editor socket is closed after the accept loop drains

mod session;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::BridgeConfig;
use crate::lifecycle::Shutdown;
use crate::net::{EditorConnection, ReloadProbe};
use crate::resilience::RetryPolicy;
use crate::server::session::Session;

/// Accepts calling clients and relays their payloads to the editor.
pub struct BridgeServer {
    config: Arc<BridgeConfig>,
    editor: Arc<EditorConnection>,
    policy: Arc<RetryPolicy>,
}

impl BridgeServer {
    /// Create a server with the default reload probe.
    pub fn new(config: Arc<BridgeConfig>) -> Self {
        let editor = Arc::new(EditorConnection::new(&config));
        Self::with_editor(config, editor)
    }

    /// Create a server whose editor connection uses a custom reload probe.
    pub fn with_probe(config: Arc<BridgeConfig>, probe: Arc<dyn ReloadProbe>) -> Self {
        let editor = Arc::new(EditorConnection::with_probe(&config, probe));
        Self::with_editor(config, editor)
    }

    fn with_editor(config: Arc<BridgeConfig>, editor: Arc<EditorConnection>) -> Self {
        let policy = Arc::new(RetryPolicy::new(&config.retry));
        Self {
            config,
            editor,
            policy,
        }
    }

    /// Run the accept loop until shutdown fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            editor = %self.editor.addr(),
            "Bridge accepting clients"
        );

        let mut shutdown_rx = shutdown.subscribe();
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Stopping accept loop");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let session = Session::new(
                                peer,
                                Arc::clone(&self.editor),
                                Arc::clone(&self.policy),
                                self.config.connection.buffer_size,
                                shutdown.subscribe(),
                            );
                            tokio::spawn(session.run(stream));
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "Accept failed");
                        }
                    }
                }
            }
        }

        self.editor.close().await;
        Ok(())
    }
}
