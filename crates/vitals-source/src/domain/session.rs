//! Per-connection lifecycle state machine.
//!
//! ```text
//! Accepted ──HandshakeStarted──► Verifying ──Accepted──► Streaming
//!                                   │  │                     │
//!                          Rejected │  │ ConnectionFailed    │ ConnectionFailed
//!                                   ▼  ▼                     ▼
//!                             Rejected ──Close──► Closed ◄───┘
//! ```
//!
//! `Closed` is terminal for the connection.  The listener then goes back to
//! waiting for the next client.

use std::fmt;

use thiserror::Error;

/// Where a single connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The TCP connection was just accepted.
    Accepted,
    /// Waiting for the initial bytes and the verifier's verdict.
    Verifying,
    /// Readings are being pushed to the client.
    Streaming,
    /// The verifier refused the client.
    Rejected,
    /// The connection is closed; nothing further happens on it.
    Closed,
}

/// Something that happened to the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    HandshakeStarted,
    Accepted,
    Rejected,
    /// Any read/write failure, EOF, or deadline on the connection.
    ConnectionFailed,
    /// Server-side close after a rejection.
    Close,
}

/// An event arrived that the current state does not allow.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid session transition: {event:?} while {from}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub event: SessionEvent,
}

impl SessionState {
    /// Applies `event` and returns the next state.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for any event the state diagram above
    /// does not allow, including every event after `Closed`.
    pub fn on(self, event: SessionEvent) -> Result<Self, InvalidTransition> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Accepted, E::HandshakeStarted) => Ok(S::Verifying),
            (S::Accepted, E::ConnectionFailed) => Ok(S::Closed),
            (S::Verifying, E::Accepted) => Ok(S::Streaming),
            (S::Verifying, E::Rejected) => Ok(S::Rejected),
            (S::Verifying, E::ConnectionFailed) => Ok(S::Closed),
            (S::Streaming, E::ConnectionFailed) => Ok(S::Closed),
            (S::Rejected, E::Close) => Ok(S::Closed),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    /// `true` once the connection can no longer change state.
    pub fn is_terminal(self) -> bool {
        self == SessionState::Closed
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Accepted => "ACCEPTED",
            SessionState::Verifying => "VERIFYING",
            SessionState::Streaming => "STREAMING",
            SessionState::Rejected => "REJECTED",
            SessionState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
