//! Deterministic random number generation.
//!
//! Uses a seeded PRNG (Xoshiro256**) that produces identical sequences
//! for identical seeds, so a sampled test subset can be reproduced.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Deterministic random number generator.
///
/// Wraps Xoshiro256** with a seed for reproducibility and implements
/// [`RngCore`], so every `rand::Rng` method is available on it.
///
/// # Example
///
/// ```rust
/// use rand::Rng;
/// use rx_sample::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let a: u64 = rng.gen();
///
/// let mut rng2 = DeterministicRng::new(12345);
/// assert_eq!(rng2.gen::<u64>(), a);
/// ```
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    seed: u64,
    rng: Xoshiro256StarStar,
    calls_count: u64,
}

/// Maximum number of RNG calls before warning.
const RNG_CALLS_WARNING_THRESHOLD: u64 = 1_000_000_000;

impl DeterministicRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            calls_count: 0,
        }
    }

    /// Get the seed used to create this RNG.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get number of raw draws made so far.
    #[must_use]
    pub fn calls_count(&self) -> u64 {
        self.calls_count
    }

    fn record_call(&mut self) {
        self.calls_count += 1;
        debug_assert!(
            self.calls_count < RNG_CALLS_WARNING_THRESHOLD,
            "Very high number of RNG calls - possible infinite loop"
        );
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.record_call();
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.record_call();
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.record_call();
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.record_call();
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;

    #[test]
    fn test_determinism() {
        let mut rng1 = DeterministicRng::new(42);
        let mut rng2 = DeterministicRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = DeterministicRng::new(42);
        let mut rng2 = DeterministicRng::new(43);

        let seq1: Vec<u64> = (0..10).map(|_| rng1.gen()).collect();
        let seq2: Vec<u64> = (0..10).map(|_| rng2.gen()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_shuffle_repeats_for_same_seed() {
        let original = vec![1, 2, 3, 4, 5];

        let mut data = original.clone();
        data.shuffle(&mut DeterministicRng::new(12345));

        let mut data2 = original;
        data2.shuffle(&mut DeterministicRng::new(12345));
        assert_eq!(data, data2);
    }

    #[test]
    fn test_calls_count() {
        let mut rng = DeterministicRng::new(12345);
        assert_eq!(rng.calls_count(), 0);

        let _ = rng.next_u64();
        assert_eq!(rng.calls_count(), 1);
        assert_eq!(rng.seed(), 12345);
    }
}
