//! Startup preflight checks.
//!
//! # Responsibilities
//! - Run the semantic configuration checks
//! - Verify the listen port is currently bindable
//!
//! # Design Decisions
//! - Preflight is advisory for the long-running service (binding the real
//!   listener is the authoritative check) and authoritative for the
//!   bridge-check binary
//! - The probe listener is dropped immediately so the port is free again

use serde::Serialize;

use crate::config::{validate_config, BridgeConfig};

/// Outcome of the deployment preflight.
#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    /// Semantic configuration problems, rendered for operators.
    pub config_errors: Vec<String>,
    /// Address the bind probe targeted.
    pub listen_addr: String,
    /// Whether the listen port could be bound.
    pub listen_bindable: bool,
    /// Bind failure detail, when there is one.
    pub bind_error: Option<String>,
}

impl PreflightReport {
    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.config_errors.is_empty() && self.listen_bindable
    }
}

/// Validate the configuration and probe the listen port.
pub async fn preflight(config: &BridgeConfig) -> PreflightReport {
    let config_errors = match validate_config(config) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };

    let listen_addr = config.network.listen_addr();
    let (listen_bindable, bind_error) = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(_) => (true, None),
        Err(err) => (false, Some(err.to_string())),
    };

    PreflightReport {
        config_errors,
        listen_addr,
        listen_bindable,
        bind_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_config_passes_when_port_is_free() {
        let mut config = BridgeConfig::default();
        // An ephemeral port is always bindable.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        config.network.mcp_port = listener.local_addr().unwrap().port();
        drop(listener);

        let report = preflight(&config).await;
        assert!(report.config_errors.is_empty());
        assert!(report.listen_bindable);
        assert!(report.passed());
    }

    #[tokio::test]
    async fn occupied_port_is_reported() {
        let mut config = BridgeConfig::default();
        let listener = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
        config.network.mcp_port = listener.local_addr().unwrap().port();

        let report = preflight(&config).await;
        assert!(!report.listen_bindable);
        assert!(report.bind_error.is_some());
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn config_errors_fail_the_preflight() {
        let mut config = BridgeConfig::default();
        config.retry.max_retries = 0;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        config.network.mcp_port = listener.local_addr().unwrap().port();
        drop(listener);

        let report = preflight(&config).await;
        assert_eq!(report.config_errors.len(), 1);
        assert!(!report.passed());
    }
}
