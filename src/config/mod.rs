//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (total per-field parse, fallback notes)
//!     → BridgeConfig (resolved, immutable)
//!     → shared via Arc to all subsystems
//!
//! Deployment checks:
//!     validation.rs (semantic checks)
//!     → consumed by lifecycle::startup and the bridge-check binary
//! ```
//!
//! # Design Decisions
//! - Config is resolved exactly once; runtime env changes have no effect
//! - Parsing is total: malformed or missing values fall back to defaults,
//!   never abort startup
//! - Validation is advisory and lives outside the load path

pub mod env;
pub mod schema;
pub mod validation;

pub use env::{load, load_from, Loaded};
pub use schema::{
    BridgeConfig, ConnectionConfig, LoggingConfig, NetworkConfig, RetryConfig, TelemetryConfig,
};
pub use validation::{validate_config, ValidationError};
