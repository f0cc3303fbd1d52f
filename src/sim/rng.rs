//! Seeded randomness shared by the simulation

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// RNG seed wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Uniform draw from `[a, b]`, inclusive on both ends.
///
/// Inverted bounds are swapped rather than rejected, so stage data with
/// `max < min` still produces a value inside the authored span.
pub fn uniform<R: Rng>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi {
        return lo;
    }
    rng.random_range(lo..=hi)
}

/// Fair coin flip
pub fn coin<R: Rng>(rng: &mut R) -> bool {
    rng.random_bool(0.5)
}
