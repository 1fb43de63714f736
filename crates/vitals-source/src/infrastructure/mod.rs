//! Infrastructure layer for vitals-source.
//!
//! Everything that touches the outside world lives here:
//!
//! - Binding the listening socket and running the accept loop
//! - The deadline-bounded initial read that feeds the verifier
//! - The periodic streamer writing framed readings
//! - Reading the optional TOML config file

pub mod config_file;
pub mod handshake;
pub mod listener;
pub mod streamer;

pub use config_file::{ConfigError, FileConfig};
pub use listener::{bind_listener, BindError, SessionOutcome, VitalsServer};
pub use streamer::{StreamEnd, StreamFailure, Streamer};
