//! Per-client relay session.
//!
//! # Responsibilities
//! - Read framed requests from one calling client
//! - Forward each payload to the editor through the retry policy
//! - Report retry exhaustion back to the client without dropping it
//!
//! # Design Decisions
//! - Payload bytes are opaque; only failures produce bridge-authored frames
//! - A client protocol error ends that session only, never the process

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::BridgeError;
use crate::net::frame::{self, Frame};
use crate::net::EditorConnection;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// One accepted client connection.
pub(crate) struct Session {
    id: Uuid,
    peer: SocketAddr,
    editor: Arc<EditorConnection>,
    policy: Arc<RetryPolicy>,
    buffer_size: usize,
    shutdown: broadcast::Receiver<()>,
}

impl Session {
    pub(crate) fn new(
        peer: SocketAddr,
        editor: Arc<EditorConnection>,
        policy: Arc<RetryPolicy>,
        buffer_size: usize,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
            editor,
            policy,
            buffer_size,
            shutdown,
        }
    }

    /// Serve the client until it disconnects, errs, or shutdown fires.
    pub(crate) async fn run(mut self, mut stream: TcpStream) {
        tracing::debug!(session = %self.id, peer = %self.peer, "Client session opened");
        metrics::record_session(true);

        loop {
            let next = tokio::select! {
                _ = self.shutdown.recv() => break,
                incoming = frame::read_frame(&mut stream, self.buffer_size) => incoming,
            };

            let payload = match next {
                Ok(Frame::Payload(payload)) => payload,
                // Clients may idle-ping; nothing to forward.
                Ok(Frame::Heartbeat) => continue,
                Err(err) => {
                    tracing::debug!(session = %self.id, error = %err, "Client session ended");
                    break;
                }
            };

            let reply = match self
                .policy
                .execute(self.editor.as_ref(), &payload, &mut self.shutdown)
                .await
            {
                Ok(response) => response,
                Err(BridgeError::Canceled) => break,
                Err(err) => {
                    tracing::debug!(session = %self.id, error = %err, "Exchange failed");
                    error_envelope(&err)
                }
            };

            if let Err(err) = frame::write_payload(&mut stream, &reply, self.buffer_size).await {
                tracing::debug!(session = %self.id, error = %err, "Failed to write reply");
                break;
            }
        }

        metrics::record_session(false);
        tracing::debug!(session = %self.id, "Client session closed");
    }
}

/// Render a bridge failure as an opaque JSON payload for the client.
///
/// Reload exhaustion keeps its advisory retry-after hint so callers can
/// decide whether to wait the editor out.
fn error_envelope(err: &BridgeError) -> Vec<u8> {
    let body = match err {
        BridgeError::Reloading { retry_after_ms } => serde_json::json!({
            "status": "error",
            "error": err.to_string(),
            "retry_after_ms": retry_after_ms,
        }),
        _ => serde_json::json!({
            "status": "error",
            "error": err.to_string(),
        }),
    };
    body.to_string().into_bytes()
}
