//! Newline-delimited JSON codec for [`VitalsReading`] frames.
//!
//! TCP is a byte stream: one `read()` may return half a record or several
//! records at once.  [`decode_reading`] works on the front of a buffer and
//! reports how many bytes it consumed; [`FrameDecoder`] owns that buffer for
//! callers that just want readings out of a socket.

use thiserror::Error;
use tracing::debug;

use super::{FRAME_DELIMITER, MAX_FRAME_LEN};
use crate::domain::reading::{RangeError, VitalsReading};

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    /// No delimiter yet; more bytes are needed.
    #[error("incomplete frame: {buffered} bytes buffered without a delimiter")]
    Incomplete { buffered: usize },

    /// The frame exceeds [`MAX_FRAME_LEN`].
    #[error("frame exceeds {max} bytes (saw {len})")]
    FrameTooLong { len: usize, max: usize },

    /// The frame is not a JSON object with exactly the four reading fields.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// The frame parsed but a field is outside its declared range.
    #[error("reading out of range: {0}")]
    OutOfRange(#[from] RangeError),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a reading as one frame: compact JSON followed by `\n`.
///
/// # Errors
///
/// Returns [`FrameError::Malformed`] if serialisation fails.
///
/// # Examples
///
/// ```rust
/// use vitals_core::{decode_reading, encode_reading, VitalsReading};
///
/// let reading = VitalsReading {
///     heart_rate: 72,
///     blood_pressure_systolic: 119,
///     blood_pressure_diastolic: 80,
///     respiration_rate: 14,
/// };
/// let bytes = encode_reading(&reading).unwrap();
/// assert_eq!(bytes.last(), Some(&b'\n'));
/// let (decoded, consumed) = decode_reading(&bytes).unwrap();
/// assert_eq!(decoded, reading);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_reading(reading: &VitalsReading) -> Result<Vec<u8>, FrameError> {
    let mut buf =
        serde_json::to_vec(reading).map_err(|e| FrameError::Malformed(e.to_string()))?;
    buf.push(FRAME_DELIMITER);
    Ok(buf)
}

/// Decodes one reading from the beginning of `bytes`.
///
/// Returns the reading and the number of bytes consumed, delimiter included,
/// so the caller can advance its read cursor.
///
/// # Errors
///
/// - [`FrameError::Incomplete`] if no delimiter has arrived yet.
/// - [`FrameError::FrameTooLong`] if the frame is longer than [`MAX_FRAME_LEN`].
/// - [`FrameError::Malformed`] for invalid JSON or extra / missing fields.
/// - [`FrameError::OutOfRange`] if a field violates its range.
pub fn decode_reading(bytes: &[u8]) -> Result<(VitalsReading, usize), FrameError> {
    let end = match bytes.iter().position(|b| *b == FRAME_DELIMITER) {
        Some(end) => end,
        None if bytes.len() > MAX_FRAME_LEN => {
            return Err(FrameError::FrameTooLong {
                len: bytes.len(),
                max: MAX_FRAME_LEN,
            })
        }
        None => {
            return Err(FrameError::Incomplete {
                buffered: bytes.len(),
            })
        }
    };

    if end > MAX_FRAME_LEN {
        return Err(FrameError::FrameTooLong {
            len: end,
            max: MAX_FRAME_LEN,
        });
    }

    let reading: VitalsReading = serde_json::from_slice(&bytes[..end])
        .map_err(|e| FrameError::Malformed(e.to_string()))?;
    reading.validate()?;
    Ok((reading, end + 1))
}

// ── Streaming decoder ─────────────────────────────────────────────────────────

/// Accumulates bytes from a stream and yields complete readings.
///
/// A bad frame is skipped up to its delimiter, so one corrupt record does not
/// poison the rest of the stream.  An over-long frame with no delimiter yet
/// clears the buffer.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes waiting for a delimiter.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Pops the next complete reading, or `Ok(None)` if more bytes are needed.
    ///
    /// # Errors
    ///
    /// Returns the [`FrameError`] for a frame that could not be decoded.  The
    /// offending bytes have already been discarded when this returns, so the
    /// caller may keep calling.
    pub fn next_reading(&mut self) -> Result<Option<VitalsReading>, FrameError> {
        match decode_reading(&self.buf) {
            Ok((reading, consumed)) => {
                self.buf.drain(..consumed);
                Ok(Some(reading))
            }
            Err(FrameError::Incomplete { .. }) => Ok(None),
            Err(e @ FrameError::FrameTooLong { .. }) => {
                debug!("discarding over-long frame: {e}");
                self.skip_frame();
                Err(e)
            }
            Err(e) => {
                self.skip_frame();
                Err(e)
            }
        }
    }

    fn skip_frame(&mut self) {
        match self.buf.iter().position(|b| *b == FRAME_DELIMITER) {
            Some(end) => {
                self.buf.drain(..=end);
            }
            None => self.buf.clear(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
