//! Protocol module containing the record framing codec.
//!
//! Wire format: one flat JSON object per reading, terminated by a single
//! `\n`.  Records are written back-to-back with no other framing.
//!
//! ```text
//! {"heart_rate":72,"blood_pressure_systolic":119,"blood_pressure_diastolic":80,"respiration_rate":14}\n
//! ```

pub mod codec;

pub use codec::{decode_reading, encode_reading, FrameDecoder, FrameError};

/// Byte that terminates every frame.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Upper bound on a single frame, delimiter excluded.
///
/// A well-formed reading is about 100 bytes; anything past this limit
/// without a delimiter means the peer is not speaking this protocol.
pub const MAX_FRAME_LEN: usize = 1024;
