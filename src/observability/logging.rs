//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at process start
//! - Honor `RUST_LOG` when set, otherwise the configured level
//! - Select the output format from configuration
//!
//! # Design Decisions
//! - JSON format for production, pretty or compact for development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level so operators can
/// raise verbosity per-target without touching the service configuration.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // An unparseable configured level falls back to info, mirroring the
        // total parse the rest of the configuration gets.
        let level = config
            .level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO);
        EnvFilter::new(level.to_string())
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }
}
