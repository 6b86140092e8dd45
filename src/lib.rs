//! Unity Editor Bridge Library
//!
//! Connection resilience layer between tool-calling clients and a running
//! Unity Editor: framed TCP exchange, heartbeat-tolerant receives, and two
//! independently budgeted retry policies.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod server;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use lifecycle::Shutdown;
pub use net::{EditorConnection, EditorState};
pub use resilience::RetryPolicy;
pub use server::BridgeServer;
