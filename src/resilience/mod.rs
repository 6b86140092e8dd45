//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the editor:
//!     → retries.rs (classify failures, enforce the two budgets)
//!     → backoff.rs (cancellable fixed-delay pacing between attempts)
//!     → net::editor (one bounded exchange per attempt)
//! ```
//!
//! # Design Decisions
//! - Two independent budgets: transient failures and reload backpressure
//!   never share a counter
//! - Fixed delays; spacing is part of the contract with the editor, not a
//!   congestion heuristic
//! - Reconnection is always caller-driven; no background reconnect tasks

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
