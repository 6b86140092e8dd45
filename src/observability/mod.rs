//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout; compact, pretty, or JSON)
//!     → Any metrics recorder installed by the embedding process
//! ```
//!
//! # Design Decisions
//! - Telemetry shipping is a collaborator concern; only the gate and the
//!   endpoint are configuration here
//! - Metric updates are cheap and safe to leave in hot paths

pub mod logging;
pub mod metrics;
