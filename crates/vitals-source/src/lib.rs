//! vitals-source library crate.
//!
//! A single-client telemetry source: it accepts one TCP connection, lets a
//! [`Verifier`](application::Verifier) look at the first bytes the client
//! sends, then pushes a fresh vitals reading every 500 ms until the
//! connection fails, and goes back to accepting.
//!
//! # Architecture
//!
//! ```text
//! TcpListener (backlog 1, SO_REUSEADDR)
//!         │ accept
//!         ▼
//! handshake::read_initial_bytes ── deadline ──► Verifier::check
//!         │ Accept                               │ Reject
//!         ▼                                      ▼
//! Streamer::run (tick → sample → frame → write)  close
//!         │ any I/O failure
//!         ▼
//! close, accept next client
//! ```
//!
//! # Layer rules
//!
//! - `domain` holds plain configuration and the per-connection state machine.
//! - `application` holds the verification capability; no I/O.
//! - `infrastructure` owns sockets, timers, and the config file.

/// Domain layer: configuration and session state.
pub mod domain;

/// Application layer: client verification.
pub mod application;

/// Infrastructure layer: listener, handshake, streamer, config file.
pub mod infrastructure;
