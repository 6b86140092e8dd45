//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits so the resolved configuration can be dumped
//! by the preflight tooling.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default telemetry collector address.
pub const DEFAULT_TELEMETRY_ENDPOINT: &str = "https://api-prod.coplay.dev/telemetry/events";

/// Root configuration for the editor bridge.
///
/// Built once at startup from environment variables (see [`crate::config::load`])
/// and shared immutably via `Arc`. Runtime environment changes have no effect
/// after startup.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Editor and listen addressing.
    pub network: NetworkConfig,

    /// Socket and framing behavior.
    pub connection: ConnectionConfig,

    /// Retry budgets and spacing.
    pub retry: RetryConfig,

    /// Telemetry gate and sink address.
    pub telemetry: TelemetryConfig,

    /// Log level and output format.
    pub logging: LoggingConfig,
}

/// Network addressing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Host the editor listens on.
    pub unity_host: String,

    /// Port the editor listens on.
    pub unity_port: u16,

    /// Port this bridge accepts clients on.
    pub mcp_port: u16,
}

impl NetworkConfig {
    /// Address of the editor peer.
    pub fn editor_addr(&self) -> String {
        format!("{}:{}", self.unity_host, self.unity_port)
    }

    /// Address this bridge binds its client listener to.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.mcp_port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            unity_host: "localhost".to_string(),
            unity_port: 6400,
            mcp_port: 6500,
        }
    }
}

/// Socket and framing behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Upper bound on establishing the editor socket, in seconds.
    pub connect_timeout_secs: f64,

    /// Maximum frame payload size in bytes.
    pub buffer_size: usize,

    /// Upper bound on one receive while tolerating heartbeats, in seconds.
    pub framed_receive_timeout_secs: f64,

    /// Heartbeat frames tolerated per receive before giving up.
    pub max_heartbeat_frames: u32,
}

impl ConnectionConfig {
    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_secs.max(0.0))
    }

    /// Framed-receive timeout as a [`Duration`].
    pub fn framed_receive_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.framed_receive_timeout_secs.max(0.0))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 1.0,
            buffer_size: 16 * 1024 * 1024,
            framed_receive_timeout_secs: 2.0,
            max_heartbeat_frames: 16,
        }
    }
}

/// Retry budgets and spacing.
///
/// The generic and reload budgets are independent: each failure kind
/// consumes only its own counter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempt budget for transient failures (connect refusals, timeouts).
    pub max_retries: u32,

    /// Spacing between transient attempts, in seconds.
    pub retry_delay_secs: f64,

    /// Spacing between attempts while the editor reloads, in milliseconds.
    /// Also returned to callers as the advisory retry-after hint.
    pub reload_retry_ms: u64,

    /// Attempt budget while the editor reports it is reloading.
    pub reload_max_retries: u32,
}

impl RetryConfig {
    /// Transient retry spacing as a [`Duration`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs.max(0.0))
    }

    /// Reload retry spacing as a [`Duration`].
    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_retry_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_delay_secs: 0.25,
            reload_retry_ms: 250,
            // 40 x 250ms gives the editor roughly ten seconds to finish a reload
            reload_max_retries: 40,
        }
    }
}

/// Telemetry gate and sink address.
///
/// The transport that ships events to the endpoint lives outside this
/// service; only the gate decision and the address are resolved here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Whether telemetry is active. The explicit disable flag always wins
    /// over the enable flag.
    pub enabled: bool,

    /// Collector address events are shipped to.
    pub endpoint: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_TELEMETRY_ENDPOINT.to_string(),
        }
    }
}

/// Log level and output format.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Output format: "compact", "pretty", or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: "compact".to_string(),
        }
    }
}
