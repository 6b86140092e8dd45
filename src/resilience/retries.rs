//! Retry logic.
//!
//! # Responsibilities
//! - Drive one editor exchange to completion or budget exhaustion
//! - Keep the transient and reload budgets independent: each failure kind
//!   consumes only its own counter
//! - Space attempts with cancellable fixed delays
//!
//! # Design Decisions
//! - Budgets count attempts, so a budget of N performs exactly N exchanges
//! - Protocol violations are surfaced immediately; the peer is incompatible,
//!   not busy
//! - Reload exhaustion closes the connection and surfaces the advisory
//!   retry-after hint to the caller

use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::RetryConfig;
use crate::error::{BridgeResult, RetryClass};
use crate::net::EditorConnection;
use crate::observability::metrics;
use crate::resilience::backoff;

/// Per-call attempt bookkeeping. Never persisted.
#[derive(Debug, Default)]
struct AttemptRecord {
    transient: u32,
    reload: u32,
}

/// Drives editor exchanges under the two configured retry budgets.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay: Duration,
    reload_max_retries: u32,
    reload_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy from the resolved retry configuration.
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            reload_max_retries: config.reload_max_retries,
            reload_delay: config.reload_delay(),
        }
    }

    /// Exchange `payload` with the editor, retrying per failure kind until
    /// a response arrives or the matching budget is exhausted.
    ///
    /// Sleeps between attempts select on `shutdown` and abort the loop with
    /// a canceled error; an exchange already in flight is not interrupted.
    pub async fn execute(
        &self,
        editor: &EditorConnection,
        payload: &[u8],
        shutdown: &mut broadcast::Receiver<()>,
    ) -> BridgeResult<Vec<u8>> {
        let mut attempts = AttemptRecord::default();

        loop {
            let err = match editor.exchange(payload).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            match err.retry_class() {
                RetryClass::Fatal => {
                    editor.close().await;
                    tracing::warn!(error = %err, "Exchange failed without retry");
                    return Err(err);
                }
                RetryClass::Transient => {
                    attempts.transient += 1;
                    metrics::record_retry("transient");
                    if attempts.transient >= self.max_retries {
                        tracing::warn!(
                            attempts = attempts.transient,
                            error = %err,
                            "Giving up after repeated transient failures"
                        );
                        return Err(err);
                    }
                    tracing::debug!(
                        attempt = attempts.transient,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    backoff::pause(self.retry_delay, shutdown).await?;
                }
                RetryClass::Reload => {
                    attempts.reload += 1;
                    metrics::record_retry("reload");
                    if attempts.reload >= self.reload_max_retries {
                        editor.close().await;
                        tracing::warn!(
                            attempts = attempts.reload,
                            "Editor still reloading after the full retry window"
                        );
                        return Err(err);
                    }
                    tracing::trace!(attempt = attempts.reload, "Editor reloading, waiting");
                    backoff::pause(self.reload_delay, shutdown).await?;
                }
            }
        }
    }
}
