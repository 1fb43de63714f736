//! Application layer: the decision whether a freshly connected client may
//! receive the stream.

pub mod verifier;

pub use verifier::{AcceptAll, Verdict, VerificationFailure, Verifier};
