//! Domain layer for vitals-source.
//!
//! Pure types with no I/O: the immutable server configuration and the
//! per-connection lifecycle state machine.

pub mod config;
pub mod session;

pub use config::ServerConfig;
pub use session::{InvalidTransition, SessionEvent, SessionState};
