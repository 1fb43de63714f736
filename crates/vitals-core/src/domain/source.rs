//! Where readings come from.
//!
//! The only production source today is [`RandomVitals`], which draws each
//! field uniformly from its closed range.  A real device feed would implement
//! [`VitalsSource`] and be handed to the streamer in its place.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::reading::{
    FieldRange, VitalsReading, BLOOD_PRESSURE_DIASTOLIC, BLOOD_PRESSURE_SYSTOLIC, HEART_RATE,
    RESPIRATION_RATE,
};

/// Produces one reading per call.
///
/// `Send` so the serve loop owning the source can run on a spawned task.
pub trait VitalsSource: Send {
    fn sample(&mut self) -> VitalsReading;
}

/// Uniform random sampler over the declared field ranges.
///
/// Each field is sampled independently; nothing carries over between calls.
pub struct RandomVitals<R = StdRng> {
    rng: R,
}

impl RandomVitals<StdRng> {
    /// Creates a sampler seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible sampler.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomVitals<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomVitals<R> {
    /// Wraps an arbitrary RNG.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn draw(&mut self, range: FieldRange) -> u16 {
        self.rng.gen_range(range.min..=range.max)
    }
}

impl<R: Rng + Send> VitalsSource for RandomVitals<R> {
    fn sample(&mut self) -> VitalsReading {
        VitalsReading {
            heart_rate: self.draw(HEART_RATE),
            blood_pressure_systolic: self.draw(BLOOD_PRESSURE_SYSTOLIC),
            blood_pressure_diastolic: self.draw(BLOOD_PRESSURE_DIASTOLIC),
            respiration_rate: self.draw(RESPIRATION_RATE),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
