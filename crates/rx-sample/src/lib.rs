//! # rx-sample
//!
//! Seeded sampling for generated test candidates.
//!
//! Sampling never touches a process-wide generator. Callers pass a
//! [`DeterministicRng`] (or any `rand::Rng`) explicitly, so a run can be
//! replayed from its seed.
//!
//! ## Reproducibility
//!
//! ```bash
//! RX_SEED=12345 rx-generate tests --signature "def add(a, b):" < response.txt
//! ```

pub mod random;
pub mod sample;

pub use random::DeterministicRng;
pub use sample::{checked_count, sample_n, SampleError};

/// Environment variable holding a sampling seed.
pub const SEED_ENV_VAR: &str = "RX_SEED";

/// Get the sampling seed from `RX_SEED` or generate a random one.
///
/// The seed is logged so the run can be reproduced.
pub fn seed_from_env() -> Result<u64, SampleError> {
    resolve_seed(std::env::var(SEED_ENV_VAR).ok())
}

fn resolve_seed(value: Option<String>) -> Result<u64, SampleError> {
    match value {
        Some(s) => {
            let seed: u64 = s.trim().parse().map_err(|_| SampleError::InvalidSeed {
                name: SEED_ENV_VAR,
                value: s.clone(),
            })?;
            tracing::info!(seed, "{}={} (from environment)", SEED_ENV_VAR, seed);
            Ok(seed)
        }
        None => {
            let seed = rand::random::<u64>();
            tracing::info!(seed, "{}={} (randomly generated)", SEED_ENV_VAR, seed);
            Ok(seed)
        }
    }
}
