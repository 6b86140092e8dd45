//! Cross-cutting error taxonomy.
//!
//! One `thiserror` enum spans every subsystem, plus a [`RetryClass`]
//! classification the retry policy uses to decide which budget (if any) a
//! failure consumes. See SPEC_FULL.md §7.

use thiserror::Error;

/// Convenience alias for fallible bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// How the retry policy should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Not retriable; surface immediately and close the connection.
    Fatal,
    /// Retriable under the generic transient budget.
    Transient,
    /// Retriable under the reload budget.
    Reload,
}

/// Every failure the bridge can surface.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Could not open (or no longer have) a socket to the editor.
    #[error("could not reach editor at {addr}: {reason}")]
    Connect {
        /// Editor address the attempt targeted.
        addr: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// No payload frame arrived within the receive window (covers both the
    /// heartbeat cap and deadline exhaustion).
    #[error("no response within receive window ({waited_ms} ms, {heartbeats} heartbeats)")]
    ReceiveTimeout {
        /// Milliseconds waited before giving up.
        waited_ms: u64,
        /// Heartbeat frames discarded while waiting.
        heartbeats: u32,
    },

    /// I/O error mid-exchange; the socket is dropped so the next attempt
    /// reconnects.
    #[error("transport error while {context}: {source}")]
    Transport {
        /// What the bridge was doing when the I/O error occurred.
        context: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The editor is reloading scripts and asked to be retried later.
    #[error("editor reloading, retry after {retry_after_ms} ms")]
    Reloading {
        /// Advisory retry-after hint in milliseconds.
        retry_after_ms: u64,
    },

    /// The peer violated the wire protocol; never retried.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Shutdown was observed during a retry sleep.
    #[error("operation canceled by shutdown")]
    Canceled,
}

impl BridgeError {
    /// Build a [`BridgeError::Transport`] from an I/O error and a context
    /// describing the in-flight operation.
    pub fn transport(context: impl Into<String>, source: std::io::Error) -> Self {
        BridgeError::Transport {
            context: context.into(),
            source,
        }
    }

    /// Classify this error for the retry policy.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            BridgeError::Connect { .. }
            | BridgeError::ReceiveTimeout { .. }
            | BridgeError::Transport { .. } => RetryClass::Transient,
            BridgeError::Reloading { .. } => RetryClass::Reload,
            BridgeError::Protocol(_) | BridgeError::Canceled => RetryClass::Fatal,
        }
    }
}
