//! Bounded uniform sampling without replacement.

use rand::Rng;

/// Errors from sampling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("Invalid argument: sample count must be non-negative, got {0}")]
    NegativeCount(i64),

    #[error("Invalid argument: {name} is not a valid u64 seed: {value}")]
    InvalidSeed { name: &'static str, value: String },
}

/// Convert a signed sample count into a usable one.
///
/// Counts arriving from configuration or the command line are signed;
/// negative values are rejected.
pub fn checked_count(n: i64) -> Result<usize, SampleError> {
    usize::try_from(n).map_err(|_| SampleError::NegativeCount(n))
}

/// Pick at most `n` items uniformly at random without replacement.
///
/// When `n >= items.len()` the input is returned unchanged, in its original
/// order. Otherwise exactly `n` distinct items are returned in random order.
pub fn sample_n<T, R>(items: Vec<T>, n: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    if n >= items.len() {
        return items;
    }

    let indices = rand::seq::index::sample(rng, items.len(), n);
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let picked: Vec<T> = indices
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    debug_assert_eq!(picked.len(), n, "index sample must be distinct");
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeterministicRng;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_more_requested_than_available_is_identity() {
        let mut rng = DeterministicRng::new(7);
        let items = strings(&["t1", "t2", "t3"]);
        assert_eq!(sample_n(items.clone(), 5, &mut rng), items);
        assert_eq!(sample_n(items.clone(), 3, &mut rng), items);
        assert_eq!(rng.calls_count(), 0);
    }

    #[test]
    fn test_zero_and_empty() {
        let mut rng = DeterministicRng::new(7);
        assert!(sample_n(strings(&["a", "b"]), 0, &mut rng).is_empty());
        assert!(sample_n(Vec::<String>::new(), 0, &mut rng).is_empty());
        assert!(sample_n(Vec::<String>::new(), 3, &mut rng).is_empty());
    }

    #[test]
    fn test_checked_count() {
        assert_eq!(checked_count(0), Ok(0));
        assert_eq!(checked_count(12), Ok(12));
        assert_eq!(checked_count(-1), Err(SampleError::NegativeCount(-1)));
    }

    #[test]
    fn test_same_seed_same_subset() {
        let items: Vec<u32> = (0..20).collect();
        let a = sample_n(items.clone(), 5, &mut DeterministicRng::new(99));
        let b = sample_n(items, 5, &mut DeterministicRng::new(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_each_item_equally_likely() {
        let mut rng = DeterministicRng::new(2024);
        let trials = 20_000;
        let mut counts = [0u32; 5];

        for _ in 0..trials {
            for picked in sample_n((0..5usize).collect::<Vec<_>>(), 2, &mut rng) {
                counts[picked] += 1;
            }
        }

        // Expected 2/5 of trials per item.
        let expected = trials as f64 * 2.0 / 5.0;
        for (item, &count) in counts.iter().enumerate() {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(
                deviation < 0.05,
                "item {} picked {} times, expected about {}",
                item,
                count,
                expected
            );
        }
    }

    proptest! {
        #[test]
        fn prop_identity_when_n_covers_items(
            items in prop::collection::vec(any::<u16>(), 0..30),
            extra in 0usize..10,
            seed in any::<u64>(),
        ) {
            let n = items.len() + extra;
            let out = sample_n(items.clone(), n, &mut DeterministicRng::new(seed));
            prop_assert_eq!(out, items);
        }

        #[test]
        fn prop_exact_distinct_subset(
            len in 1usize..40,
            frac in 0.0f64..1.0,
            seed in any::<u64>(),
        ) {
            let items: Vec<usize> = (0..len).collect();
            let n = ((len as f64) * frac) as usize;
            prop_assume!(n < len);

            let out = sample_n(items, n, &mut DeterministicRng::new(seed));
            prop_assert_eq!(out.len(), n);

            let unique: HashSet<usize> = out.iter().copied().collect();
            prop_assert_eq!(unique.len(), n);
            prop_assert!(out.iter().all(|&i| i < len));
        }
    }
}
