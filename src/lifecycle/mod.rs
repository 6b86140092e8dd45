//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → preflight checks → bind listener → accept traffic
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → retry loops abort between
//!     attempts → editor socket closed → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{preflight, PreflightReport};
