use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The source of randomness used when generating a voter roll.
///
/// Every `rand::Rng` is a random source. Tests may provide their own
/// implementation to script the draws.
pub trait RandomSource {
    /// A uniform integer in `[low, high]`. Callers guarantee `low <= high`.
    fn int_in_range(&mut self, low: u32, high: u32) -> u32;
    /// A uniform index in `[0, len)`. Callers guarantee `len > 0`.
    fn index(&mut self, len: usize) -> usize;
    /// A uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    fn int_in_range(&mut self, low: u32, high: u32) -> u32 {
        self.gen_range(low..=high)
    }

    fn index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// A reproducible source: the same seed always generates the same roll.
pub fn seeded_source(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn entropy_source() -> StdRng {
    StdRng::from_entropy()
}
