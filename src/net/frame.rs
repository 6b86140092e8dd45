//! Length-prefixed frame codec.
//!
//! # Wire Format
//! ```text
//! [4-byte length, u32 big-endian] [payload bytes]
//! ```
//! A zero length prefix is the heartbeat sentinel: the peer is alive but has
//! no response ready, and no payload bytes follow. Because of the sentinel,
//! an empty payload is unrepresentable and refusing to send one is a
//! protocol error on our side.
//!
//! # Design Decisions
//! - Generic over AsyncRead/AsyncWrite so the real socket and test peers
//!   share one codec
//! - A declared length above the configured buffer size is rejected before
//!   any payload byte is read

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{BridgeError, BridgeResult};

/// One unit of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Peer is alive but has no response ready yet.
    Heartbeat,
    /// An opaque response or request body.
    Payload(Vec<u8>),
}

impl Frame {
    /// Whether this frame is a heartbeat.
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Frame::Heartbeat)
    }
}

/// Classifies payloads that are the peer's "busy reloading, retry later"
/// indicator.
///
/// The indicator's encoding belongs to the peer protocol, so it is kept
/// pluggable; the codec only guarantees that heartbeats carry no payload.
pub trait ReloadProbe: Send + Sync {
    /// Report whether `payload` asks the caller to retry after a reload.
    fn is_reload_signal(&self, payload: &[u8]) -> bool;
}

/// Probe for peers that report reload state as a JSON object with
/// `"status": "reloading"`, the convention the Unity editor plugin uses.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStatusProbe;

impl ReloadProbe for JsonStatusProbe {
    fn is_reload_signal(&self, payload: &[u8]) -> bool {
        match serde_json::from_slice::<serde_json::Value>(payload) {
            Ok(value) => {
                value.get("status").and_then(serde_json::Value::as_str) == Some("reloading")
            }
            Err(_) => false,
        }
    }
}

/// Write one payload frame.
pub async fn write_payload<W>(writer: &mut W, data: &[u8], max_payload: usize) -> BridgeResult<()>
where
    W: AsyncWrite + Unpin,
{
    if data.is_empty() {
        return Err(BridgeError::Protocol(
            "empty payloads are reserved as heartbeats".to_string(),
        ));
    }
    let limit = max_payload.min(u32::MAX as usize);
    if data.len() > limit {
        return Err(BridgeError::Protocol(format!(
            "outgoing frame of {} bytes exceeds the {} byte limit",
            data.len(),
            limit
        )));
    }

    writer
        .write_all(&(data.len() as u32).to_be_bytes())
        .await
        .map_err(|e| BridgeError::transport("writing length prefix", e))?;
    writer
        .write_all(data)
        .await
        .map_err(|e| BridgeError::transport("writing payload", e))?;
    writer
        .flush()
        .await
        .map_err(|e| BridgeError::transport("flushing frame", e))?;
    Ok(())
}

/// Write one heartbeat frame.
pub async fn write_heartbeat<W>(writer: &mut W) -> BridgeResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(&0u32.to_be_bytes())
        .await
        .map_err(|e| BridgeError::transport("writing heartbeat", e))?;
    writer
        .flush()
        .await
        .map_err(|e| BridgeError::transport("flushing heartbeat", e))?;
    Ok(())
}

/// Read one frame.
///
/// A declared length above `max_payload` fails with a protocol error before
/// any payload byte is consumed.
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> BridgeResult<Frame>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    reader
        .read_exact(&mut prefix)
        .await
        .map_err(|e| BridgeError::transport("reading length prefix", e))?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len == 0 {
        return Ok(Frame::Heartbeat);
    }
    if len > max_payload {
        return Err(BridgeError::Protocol(format!(
            "peer declared a {} byte frame, limit is {} bytes",
            len, max_payload
        )));
    }

    let mut data = vec![0u8; len];
    reader
        .read_exact(&mut data)
        .await
        .map_err(|e| BridgeError::transport("reading payload", e))?;
    Ok(Frame::Payload(data))
}
