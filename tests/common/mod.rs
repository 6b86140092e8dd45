//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use unity_bridge::net::frame::{self, Frame};

/// Generous frame limit for the mock's own reads and writes.
const MOCK_LIMIT: usize = 16 * 1024 * 1024;

/// What the mock editor does with one incoming request.
#[allow(dead_code)]
pub enum MockReply {
    /// Send this many heartbeat frames, then the payload.
    HeartbeatsThen(u32, Vec<u8>),
    /// Report that the editor is reloading scripts.
    Reloading,
    /// Declare a frame of this many bytes without sending a body.
    Oversized(u32),
    /// Swallow the request and never answer.
    Silent,
}

/// Start a framed mock editor and return its address.
///
/// The behavior closure sees each request payload and decides the reply.
pub async fn start_mock_editor<F>(behavior: F) -> SocketAddr
where
    F: Fn(Vec<u8>) -> MockReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let behavior = Arc::new(behavior);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let behavior = behavior.clone();
                    tokio::spawn(async move {
                        serve_editor(stream, behavior).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_editor<F>(mut stream: TcpStream, behavior: Arc<F>)
where
    F: Fn(Vec<u8>) -> MockReply + Send + Sync + 'static,
{
    loop {
        let request = match frame::read_frame(&mut stream, MOCK_LIMIT).await {
            Ok(Frame::Payload(payload)) => payload,
            Ok(Frame::Heartbeat) => continue,
            Err(_) => break,
        };

        match (behavior.as_ref())(request) {
            MockReply::HeartbeatsThen(count, payload) => {
                for _ in 0..count {
                    if frame::write_heartbeat(&mut stream).await.is_err() {
                        return;
                    }
                }
                if frame::write_payload(&mut stream, &payload, MOCK_LIMIT)
                    .await
                    .is_err()
                {
                    return;
                }
            }
            MockReply::Reloading => {
                if frame::write_payload(&mut stream, br#"{"status":"reloading"}"#, MOCK_LIMIT)
                    .await
                    .is_err()
                {
                    return;
                }
            }
            MockReply::Oversized(declared) => {
                let _ = stream.write_all(&declared.to_be_bytes()).await;
                let _ = stream.flush().await;
            }
            MockReply::Silent => {}
        }
    }
}

/// An address on which connections are currently refused.
#[allow(dead_code)]
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
