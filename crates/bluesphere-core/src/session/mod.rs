//! Coordination server session types.
//!
//! - **Protocol**: packets exchanged with the Archipelago server
//! - **Channel**: the transport abstraction the client sends through
//!
//! The concrete WebSocket transport lives in the CLI; everything here is
//! transport independent so the client logic can be driven by tests.

mod channel;
mod protocol;

pub use channel::{SessionChannel, SessionConfig, tags};
pub use protocol::*;
