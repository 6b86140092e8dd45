//! Metrics collection.
//!
//! # Metrics
//! - `bridge_connect_total` (counter): connect attempts by outcome
//! - `bridge_heartbeats_discarded_total` (counter): heartbeat frames
//!   consumed while waiting for a payload
//! - `bridge_reload_signals_total` (counter): responses that reported the
//!   editor reloading
//! - `bridge_retries_total` (counter): retry attempts by kind
//! - `bridge_active_sessions` (gauge): currently-open client sessions
//!
//! # Design Decisions
//! - Helpers keep metric names in one place; call sites stay one-liners
//! - No exporter is installed here; without a recorder these are no-ops

use metrics::{counter, gauge};

/// Record one connect attempt and its outcome.
pub fn record_connect(success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!("bridge_connect_total", "outcome" => outcome).increment(1);
}

/// Record a heartbeat frame discarded during a receive.
pub fn record_heartbeat_discarded() {
    counter!("bridge_heartbeats_discarded_total").increment(1);
}

/// Record a response that reported the editor reloading.
pub fn record_reload_signal() {
    counter!("bridge_reload_signals_total").increment(1);
}

/// Record a retry attempt. `kind` is "transient" or "reload".
pub fn record_retry(kind: &'static str) {
    counter!("bridge_retries_total", "kind" => kind).increment(1);
}

/// Track the number of open client sessions.
pub fn record_session(opened: bool) {
    let sessions = gauge!("bridge_active_sessions");
    if opened {
        sessions.increment(1.0);
    } else {
        sessions.decrement(1.0);
    }
}
