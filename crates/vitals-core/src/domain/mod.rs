//! Domain types: the vitals reading and where readings come from.
//!
//! Nothing in here performs I/O.

pub mod reading;
pub mod source;

pub use reading::{FieldRange, RangeError, VitalsReading};
pub use source::{RandomVitals, VitalsSource};
