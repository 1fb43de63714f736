//! # vitals-core
//!
//! Shared library for vitals-stream containing the reading type, the
//! synthetic sampler, and the wire frame codec.
//!
//! This crate is used by both the source (server) and the monitor (client).
//! It has no dependencies on network sockets or an async runtime.
//!
//! # Architecture overview
//!
//! The vitals source accepts one TCP client at a time and pushes a fresh
//! reading to it every 500 ms.  This crate defines what travels over that
//! connection:
//!
//! - **`domain`** – The [`VitalsReading`] record, the closed ranges each field
//!   is drawn from, and the [`VitalsSource`] trait with its uniform random
//!   implementation [`RandomVitals`].
//!
//! - **`protocol`** – How readings become bytes.  Each reading is a flat JSON
//!   object terminated by `\n`, so a receiver can split a continuous byte
//!   stream into discrete records.

pub mod domain;
pub mod protocol;

pub use domain::reading::{FieldRange, RangeError, VitalsReading};
pub use domain::source::{RandomVitals, VitalsSource};
pub use protocol::codec::{decode_reading, encode_reading, FrameDecoder, FrameError};
