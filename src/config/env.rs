//! Environment-variable resolution.
//!
//! # Responsibilities
//! - Resolve every configuration field from its environment key exactly once
//! - Total parsing: a missing or malformed value falls back to the field's
//!   default, never an error
//! - Record which present-but-malformed values fell back, so startup can
//!   log them
//!
//! # Design Decisions
//! - Lookup is injected as a closure so tests never mutate process env
//! - Negative numbers for durations and counts count as malformed
//! - The telemetry disable flag always wins over the enable flag

use std::str::FromStr;

use crate::config::schema::{BridgeConfig, DEFAULT_TELEMETRY_ENDPOINT};

/// A resolved configuration plus the names of fields whose environment
/// values were present but unusable.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// The fully-resolved configuration.
    pub config: BridgeConfig,
    /// Environment keys whose values were malformed and fell back.
    pub defaulted: Vec<&'static str>,
}

/// Resolve the configuration from the process environment.
pub fn load() -> Loaded {
    load_from(|key| std::env::var(key).ok())
}

/// Resolve the configuration from an arbitrary lookup function.
///
/// The lookup is consulted once per field; `None` means the key is unset.
pub fn load_from<F>(lookup: F) -> Loaded
where
    F: Fn(&str) -> Option<String>,
{
    let mut reader = EnvReader {
        lookup,
        defaulted: Vec::new(),
    };

    let mut config = BridgeConfig::default();

    config.network.unity_host = reader.string("UNITY_HOST", "localhost");
    config.network.unity_port = reader.number("UNITY_PORT", 6400u16);
    config.network.mcp_port = reader.number("MCP_PORT", 6500u16);

    config.connection.connect_timeout_secs = reader.float("CONNECTION_TIMEOUT", 1.0);
    config.connection.buffer_size = reader.number("BUFFER_SIZE", 16 * 1024 * 1024usize);
    config.connection.framed_receive_timeout_secs = reader.float("FRAMED_RECEIVE_TIMEOUT", 2.0);
    config.connection.max_heartbeat_frames = reader.number("MAX_HEARTBEAT_FRAMES", 16u32);

    config.retry.max_retries = reader.number("MAX_RETRIES", 10u32);
    config.retry.retry_delay_secs = reader.float("RETRY_DELAY", 0.25);
    config.retry.reload_retry_ms = reader.number("RELOAD_RETRY_MS", 250u64);
    config.retry.reload_max_retries = reader.number("RELOAD_MAX_RETRIES", 40u32);

    config.telemetry.enabled =
        reader.boolean("TELEMETRY_ENABLED", true) && !reader.boolean("DISABLE_TELEMETRY", false);
    config.telemetry.endpoint = reader.string("TELEMETRY_ENDPOINT", DEFAULT_TELEMETRY_ENDPOINT);

    config.logging.level = reader.string("LOG_LEVEL", "INFO");
    config.logging.format = reader.string("LOG_FORMAT", "compact");

    Loaded {
        config,
        defaulted: reader.defaulted,
    }
}

struct EnvReader<F> {
    lookup: F,
    defaulted: Vec<&'static str>,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn string(&mut self, key: &'static str, default: &str) -> String {
        match self.raw(key) {
            Some(value) => value,
            None => default.to_string(),
        }
    }

    fn boolean(&mut self, key: &'static str, default: bool) -> bool {
        match self.raw(key) {
            None => default,
            Some(raw) => match parse_bool(&raw) {
                Some(value) => value,
                None => {
                    self.defaulted.push(key);
                    default
                }
            },
        }
    }

    fn number<T>(&mut self, key: &'static str, default: T) -> T
    where
        T: FromStr,
    {
        match self.raw(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => value,
                Err(_) => {
                    self.defaulted.push(key);
                    default
                }
            },
        }
    }

    fn float(&mut self, key: &'static str, default: f64) -> f64 {
        match self.raw(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<f64>() {
                // Durations must be finite and non-negative.
                Ok(value) if value.is_finite() && value >= 0.0 => value,
                _ => {
                    self.defaulted.push(key);
                    default
                }
            },
        }
    }
}

/// Parse the documented boolean vocabulary, case-insensitively.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
