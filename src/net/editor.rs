//! Editor connection state machine and framed exchange.
//!
//! # Responsibilities
//! - Own the single socket to the editor (never shared)
//! - Connect with the configured timeout; one attempt per call, retries
//!   belong to the caller's policy
//! - Heartbeat-tolerant receive with a frame cap and an overall deadline
//! - Serialize send→receive exchanges so responses cannot be attributed to
//!   the wrong request
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting → Connected → Reloading → Connected
//!                     │             │          │
//!                     └─────────────┴──────────┴──→ Disconnected
//!                        (connect failure, close, unrecoverable error)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::net::frame::{self, Frame, JsonStatusProbe, ReloadProbe};
use crate::observability::metrics;

/// Lifecycle state of the editor socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No socket; the next exchange will connect first.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// Socket open, editor answering normally.
    Connected,
    /// Socket open, editor asked to be retried while it reloads scripts.
    Reloading,
}

struct Inner {
    state: EditorState,
    stream: Option<TcpStream>,
    /// Consecutive failed connect attempts; reset when one succeeds.
    connect_attempts: u32,
}

/// The single logical channel to the editor.
///
/// All operations take `&self`; an internal mutex serializes access so a
/// full send→receive exchange is atomic with respect to other callers.
/// Concurrent callers queue rather than opening additional sockets.
pub struct EditorConnection {
    addr: String,
    connect_timeout: Duration,
    receive_timeout: Duration,
    buffer_size: usize,
    max_heartbeat_frames: u32,
    reload_retry_ms: u64,
    probe: Arc<dyn ReloadProbe>,
    inner: Mutex<Inner>,
}

impl EditorConnection {
    /// Create a connection manager with the default JSON reload probe.
    pub fn new(config: &BridgeConfig) -> Self {
        Self::with_probe(config, Arc::new(JsonStatusProbe))
    }

    /// Create a connection manager with a custom reload probe.
    pub fn with_probe(config: &BridgeConfig, probe: Arc<dyn ReloadProbe>) -> Self {
        Self {
            addr: config.network.editor_addr(),
            connect_timeout: config.connection.connect_timeout(),
            receive_timeout: config.connection.framed_receive_timeout(),
            buffer_size: config.connection.buffer_size,
            max_heartbeat_frames: config.connection.max_heartbeat_frames,
            reload_retry_ms: config.retry.reload_retry_ms,
            probe,
            inner: Mutex::new(Inner {
                state: EditorState::Disconnected,
                stream: None,
                connect_attempts: 0,
            }),
        }
    }

    /// Address of the editor peer.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> EditorState {
        self.inner.lock().await.state
    }

    /// Open the socket if it is not already open.
    ///
    /// Performs a single attempt bounded by the connect timeout; on failure
    /// the state returns to [`EditorState::Disconnected`] and the error is
    /// left to the caller's retry policy.
    pub async fn connect(&self) -> BridgeResult<()> {
        let mut inner = self.inner.lock().await;
        self.ensure_connected(&mut inner).await
    }

    /// Write one payload frame.
    ///
    /// Fails with a connect error if the socket is not open; no implicit
    /// connect happens here.
    pub async fn send(&self, payload: &[u8]) -> BridgeResult<()> {
        let mut inner = self.inner.lock().await;
        self.send_locked(&mut inner, payload).await
    }

    /// Consume frames until a payload arrives or the receive window closes.
    pub async fn receive(&self) -> BridgeResult<Vec<u8>> {
        let mut inner = self.inner.lock().await;
        let result = self.receive_locked(&mut inner).await;
        if let Err(ref err) = result {
            self.quarantine(&mut inner, err);
        }
        result
    }

    /// One request/response exchange: connect if needed, send the payload,
    /// and receive the matching response.
    ///
    /// The internal lock is held for the whole exchange, so concurrent
    /// callers cannot interleave their frames.
    pub async fn exchange(&self, payload: &[u8]) -> BridgeResult<Vec<u8>> {
        let mut inner = self.inner.lock().await;
        self.ensure_connected(&mut inner).await?;

        let result = match self.send_locked(&mut inner, payload).await {
            Ok(()) => self.receive_locked(&mut inner).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                if self.probe.is_reload_signal(&response) {
                    inner.state = EditorState::Reloading;
                    metrics::record_reload_signal();
                    return Err(BridgeError::Reloading {
                        retry_after_ms: self.reload_retry_ms,
                    });
                }
                inner.state = EditorState::Connected;
                Ok(response)
            }
            Err(err) => {
                self.quarantine(&mut inner, &err);
                Err(err)
            }
        }
    }

    /// Release the socket. Idempotent.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if inner.stream.take().is_some() {
            tracing::debug!(addr = %self.addr, "Editor connection closed");
        }
        inner.state = EditorState::Disconnected;
    }

    async fn ensure_connected(&self, inner: &mut Inner) -> BridgeResult<()> {
        if inner.stream.is_some() {
            return Ok(());
        }

        inner.state = EditorState::Connecting;
        inner.connect_attempts += 1;
        let attempt = inner.connect_attempts;

        match timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => {
                let _ = stream.set_nodelay(true);
                tracing::debug!(addr = %self.addr, attempt, "Editor connection established");
                metrics::record_connect(true);
                inner.stream = Some(stream);
                inner.state = EditorState::Connected;
                inner.connect_attempts = 0;
                Ok(())
            }
            Ok(Err(err)) => {
                inner.state = EditorState::Disconnected;
                metrics::record_connect(false);
                Err(BridgeError::Connect {
                    addr: self.addr.clone(),
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                inner.state = EditorState::Disconnected;
                metrics::record_connect(false);
                Err(BridgeError::Connect {
                    addr: self.addr.clone(),
                    reason: format!("no answer within {:?}", self.connect_timeout),
                })
            }
        }
    }

    async fn send_locked(&self, inner: &mut Inner, payload: &[u8]) -> BridgeResult<()> {
        let stream = match inner.stream.as_mut() {
            Some(stream) => stream,
            None => {
                return Err(BridgeError::Connect {
                    addr: self.addr.clone(),
                    reason: "socket is not open".to_string(),
                })
            }
        };
        frame::write_payload(stream, payload, self.buffer_size).await
    }

    async fn receive_locked(&self, inner: &mut Inner) -> BridgeResult<Vec<u8>> {
        let stream = match inner.stream.as_mut() {
            Some(stream) => stream,
            None => {
                return Err(BridgeError::Connect {
                    addr: self.addr.clone(),
                    reason: "socket is not open".to_string(),
                })
            }
        };

        let started = Instant::now();
        let deadline = started + self.receive_timeout;
        let mut heartbeats = 0u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.receive_timeout_error(started, heartbeats));
            }

            match timeout(remaining, frame::read_frame(stream, self.buffer_size)).await {
                Err(_) => return Err(self.receive_timeout_error(started, heartbeats)),
                Ok(Err(err)) => return Err(err),
                Ok(Ok(Frame::Heartbeat)) => {
                    heartbeats += 1;
                    metrics::record_heartbeat_discarded();
                    if heartbeats >= self.max_heartbeat_frames {
                        tracing::debug!(
                            addr = %self.addr,
                            heartbeats,
                            "Heartbeat tolerance exhausted before a payload frame"
                        );
                        return Err(self.receive_timeout_error(started, heartbeats));
                    }
                }
                Ok(Ok(Frame::Payload(data))) => return Ok(data),
            }
        }
    }

    fn receive_timeout_error(&self, started: Instant, heartbeats: u32) -> BridgeError {
        BridgeError::ReceiveTimeout {
            waited_ms: started.elapsed().as_millis() as u64,
            heartbeats,
        }
    }

    /// Drop the socket after a failure that taints it. A late reply landing
    /// after a timeout must never be attributed to the next request, so
    /// timeouts discard the stream along with transport and protocol errors.
    fn quarantine(&self, inner: &mut Inner, err: &BridgeError) {
        match err {
            BridgeError::Protocol(_)
            | BridgeError::Transport { .. }
            | BridgeError::ReceiveTimeout { .. } => {
                inner.stream = None;
                inner.state = EditorState::Disconnected;
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for EditorConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorConnection")
            .field("addr", &self.addr)
            .field("connect_timeout", &self.connect_timeout)
            .field("receive_timeout", &self.receive_timeout)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}
