//! Client verification gate.
//!
//! The source reads whatever the client sends right after connecting and
//! asks a [`Verifier`] for a [`Verdict`].  Only accepted clients reach the
//! streamer.  [`AcceptAll`] is the only shipped policy: there is no
//! authentication scheme yet, and a real credential or challenge check is
//! meant to drop in here without touching the listener or streamer.

use thiserror::Error;

/// Outcome of a verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Decides whether a client may be streamed to, based on its initial bytes.
///
/// `initial` is empty when the client sent nothing before the handshake
/// deadline.
pub trait Verifier: Send + Sync {
    fn check(&self, initial: &[u8]) -> Verdict;
}

/// Accepts every client regardless of what it sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Verifier for AcceptAll {
    fn check(&self, _initial: &[u8]) -> Verdict {
        Verdict::Accept
    }
}

/// Any `Fn(&[u8]) -> Verdict` closure is a verifier.
impl<F> Verifier for F
where
    F: Fn(&[u8]) -> Verdict + Send + Sync,
{
    fn check(&self, initial: &[u8]) -> Verdict {
        self(initial)
    }
}

/// Why a connection never reached the streaming state.
#[derive(Debug, Error)]
pub enum VerificationFailure {
    /// The client closed the connection before sending anything.
    #[error("client closed the connection before verification")]
    ClientClosed,

    /// The initial read failed.
    #[error("initial read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The verifier refused the client.
    #[error("client rejected by verifier")]
    Rejected,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
