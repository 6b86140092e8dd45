//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing request:
//!     → editor.rs (state machine, exclusive send→receive exchange)
//!     → frame.rs (length-prefixed encode)
//!     → TCP socket to the editor
//!
//! Incoming bytes:
//!     → frame.rs (decode; heartbeat vs payload)
//!     → editor.rs (heartbeat filtering, receive deadline, reload probe)
//! ```
//!
//! # Design Decisions
//! - One socket to the editor, owned exclusively; callers queue for it
//! - Heartbeats never surface to callers; they only extend patience up to
//!   the configured cap
//! - The reload indicator's encoding stays behind a probe trait

pub mod editor;
pub mod frame;

pub use editor::{EditorConnection, EditorState};
pub use frame::{Frame, JsonStatusProbe, ReloadProbe};
