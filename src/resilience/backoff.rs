//! Retry pacing.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::error::{BridgeError, BridgeResult};

/// Sleep between retry attempts, aborting early on shutdown.
///
/// Cancellation only happens between attempts; a socket operation already
/// in flight is never interrupted by this primitive.
pub async fn pause(delay: Duration, shutdown: &mut broadcast::Receiver<()>) -> BridgeResult<()> {
    tokio::select! {
        _ = tokio::time::sleep(delay) => Ok(()),
        _ = shutdown.recv() => Err(BridgeError::Canceled),
    }
}
