//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic checks the total env parse cannot express
//! - Validate value ranges (ports in the unprivileged TCP range, budgets
//!   and timeouts non-zero)
//! - Detect the editor and listen ports colliding
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: BridgeConfig -> Result<(), Vec<ValidationError>>
//! - Consumed by preflight tooling; the core loader never rejects a config

use crate::config::schema::BridgeConfig;

/// Lowest port preflight accepts; privileged ports need root and are
/// never what a local editor bridge wants.
const MIN_PORT: u16 = 1024;

/// A single semantic problem with the resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A port is outside the accepted range.
    PortOutOfRange {
        /// Which field the port came from.
        field: &'static str,
        /// The offending value.
        value: u16,
    },
    /// The editor port and the listen port are the same.
    PortsCollide {
        /// The shared port value.
        port: u16,
    },
    /// A budget, cap, or timeout that must be positive is zero.
    MustBePositive {
        /// Which field is zero.
        field: &'static str,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::PortOutOfRange { field, value } => {
                write!(f, "{} ({}) is not in the valid port range {}-65535", field, value, MIN_PORT)
            }
            ValidationError::PortsCollide { port } => {
                write!(f, "editor port and listen port are both {}", port)
            }
            ValidationError::MustBePositive { field } => {
                write!(f, "{} must be greater than zero", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a resolved configuration for deployment problems.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_port(&mut errors, "unity_port", config.network.unity_port);
    check_port(&mut errors, "mcp_port", config.network.mcp_port);
    if config.network.unity_port == config.network.mcp_port {
        errors.push(ValidationError::PortsCollide {
            port: config.network.unity_port,
        });
    }

    check_positive(&mut errors, "buffer_size", config.connection.buffer_size > 0);
    check_positive(
        &mut errors,
        "connect_timeout_secs",
        config.connection.connect_timeout_secs > 0.0,
    );
    check_positive(
        &mut errors,
        "framed_receive_timeout_secs",
        config.connection.framed_receive_timeout_secs > 0.0,
    );
    check_positive(
        &mut errors,
        "max_heartbeat_frames",
        config.connection.max_heartbeat_frames > 0,
    );
    check_positive(&mut errors, "max_retries", config.retry.max_retries > 0);
    check_positive(
        &mut errors,
        "reload_max_retries",
        config.retry.reload_max_retries > 0,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_port(errors: &mut Vec<ValidationError>, field: &'static str, value: u16) {
    if value < MIN_PORT {
        errors.push(ValidationError::PortOutOfRange { field, value });
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, ok: bool) {
    if !ok {
        errors.push(ValidationError::MustBePositive { field });
    }
}
