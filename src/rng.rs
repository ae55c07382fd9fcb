//! Seedable RNG wrapper used by every [`crate::core::RcTree`].
//!
//! Mirrors the role of `clam::Space::choose_unique`'s `ChaCha8Rng` use: a
//! fixed, explicit backend so that runs are reproducible given a seed,
//! without ever sharing a single RNG instance across trees.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Owned RNG state for a single tree.
///
/// Never clone or share a live `RrcfRng` across trees; each tree must own an
/// independently-seeded instance (see [`split_seed`]).
#[derive(Debug, Clone)]
pub struct RrcfRng {
    rng: ChaCha8Rng,
}

impl RrcfRng {
    /// Seeds deterministically from a `u64`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds from the system entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Draws `u ~ U(min, max)`.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Draws an index in `[0, weights.len())` with probability proportional
    /// to `weights`. Iterates the cumulative distribution and picks the
    /// smallest index whose CDF meets or exceeds the draw, per the cut
    /// primitive's weighted-choice rule.
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let draw = self.uniform(0.0, total);
        let mut cumulative = 0.0;
        for (i, &w) in weights.iter().enumerate() {
            cumulative += w;
            if cumulative >= draw {
                return i;
            }
        }
        weights.len() - 1
    }

    /// Chooses `n` indices from `0..range` without replacement, in the
    /// style of `clam::Space::choose_unique`: shuffle the full index range
    /// and take a prefix.
    pub fn sample_without_replacement(&mut self, range: usize, n: usize) -> Vec<usize> {
        let n = n.min(range);
        let mut indices: Vec<usize> = (0..range).collect();
        indices.shuffle(&mut self.rng);
        indices.truncate(n);
        indices
    }

    /// Shuffles a slice in place.
    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        values.shuffle(&mut self.rng);
    }
}

/// Derives the next seed in a splitmix64 sequence, producing independent
/// per-tree seeds from a single forest-level parent seed.
pub fn split_seed(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_choice_picks_only_positive_span_dimension() {
        let mut rng = RrcfRng::new(42);
        for _ in 0..50 {
            let choice = rng.weighted_choice(&[0.0, 1.0, 0.0]);
            assert_eq!(choice, 1);
        }
    }

    #[test]
    fn split_seed_is_deterministic_and_varies() {
        let mut state = 7u64;
        let a = split_seed(&mut state);
        let b = split_seed(&mut state);
        assert_ne!(a, b);

        let mut state2 = 7u64;
        let a2 = split_seed(&mut state2);
        assert_eq!(a, a2);
    }

    #[test]
    fn sample_without_replacement_has_no_duplicates() {
        let mut rng = RrcfRng::new(1);
        let sample = rng.sample_without_replacement(20, 7);
        assert_eq!(sample.len(), 7);
        let mut sorted = sample.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 7);
    }
}
