//! Weighted sampling with replacement.
//!
//! Two resamplers are provided:
//!
//! - [`WeightedSampler`]: independent (multinomial) draws. Builds a
//!   cumulative weight array once, then each draw is a uniform variate
//!   followed by a binary search (`O(log n)` per draw).
//! - [`low_variance_resample`]: systematic resampling with a single random
//!   offset and evenly spaced pointers. Lower variance, `O(n)` total.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which resampling scheme the particle filter uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplingStrategy {
    /// Independent weighted draws (cumulative array + binary search).
    #[default]
    Multinomial,
    /// Systematic low-variance resampling.
    LowVariance,
}

/// Cumulative-weight table for repeated weighted draws.
#[derive(Clone, Debug)]
pub struct WeightedSampler {
    cumulative: Vec<f64>,
}

impl WeightedSampler {
    /// Build a sampler from non-negative weights.
    ///
    /// Returns `None` when there are no weights, when the total is zero, or
    /// when any weight is negative or not finite. Callers decide the fallback.
    pub fn new(weights: &[f64]) -> Option<Self> {
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut sum = 0.0;
        for &w in weights {
            if !w.is_finite() || w < 0.0 {
                return None;
            }
            sum += w;
            cumulative.push(sum);
        }

        if sum <= 0.0 || !sum.is_finite() {
            return None;
        }

        Some(Self { cumulative })
    }

    /// Sampler that treats every index as equally likely.
    pub fn uniform(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            cumulative: (1..=len).map(|i| i as f64).collect(),
        })
    }

    /// Number of indices this sampler draws from.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// True if the sampler has no indices (never the case for a built sampler).
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Total weight.
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Index selected by a variate `u` in `[0, 1)`.
    ///
    /// Picks the first index whose cumulative weight exceeds `u * total`, so
    /// zero-weight entries are never selected.
    pub fn index_for(&self, u: f64) -> usize {
        let target = u * self.total();
        let idx = self.cumulative.partition_point(|&c| c <= target);
        idx.min(self.cumulative.len() - 1)
    }

    /// Draw one index.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.index_for(rng.random::<f64>())
    }

    /// Draw `n` indices with replacement.
    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<usize> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

/// Systematic resampling: `n` evenly spaced pointers with one random offset.
///
/// Returns `None` under the same conditions as [`WeightedSampler::new`].
pub fn low_variance_resample<R: Rng + ?Sized>(
    weights: &[f64],
    n: usize,
    rng: &mut R,
) -> Option<Vec<usize>> {
    let sampler = WeightedSampler::new(weights)?;
    let step = 1.0 / n.max(1) as f64;
    let offset = rng.random::<f64>() * step;

    Some(
        (0..n)
            .map(|i| sampler.index_for(offset + i as f64 * step))
            .collect(),
    )
}
