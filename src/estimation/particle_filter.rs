//! Grid particle filter tracking one other agent from range readings.
//!
//! Each particle is a flat cell index. One tick of [`Estimator::update_estimate`]:
//!
//! 1. **Motion**: draw a fresh particle set from the current belief and move
//!    every particle one step through the [`TransitionModel`]. Skipped for
//!    parked agents, which keep the retained set.
//! 2. **Weighting**: Gaussian likelihood of the measured range given the
//!    distance from the observer to each particle's cell center, computed in
//!    log space and shifted by the maximum log weight.
//! 3. **Resampling**: same-size draw with replacement using the configured
//!    [`ResamplingStrategy`].
//! 4. **Reconstruction**: the belief is the normalized particle histogram.

use std::sync::Arc;

use log::{trace, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::core::{ResamplingStrategy, WeightedSampler, WorldPoint, low_variance_resample};
use crate::error::{MargaError, Result};
use crate::layout::Layout;

use super::belief::BeliefGrid;
use super::transition::TransitionModel;

/// Configuration for the particle filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Particles per grid cell. The set holds `rows * cols * particle_factor`.
    #[serde(default = "defaults::particle_factor")]
    pub particle_factor: usize,

    /// Standard deviation of the range sensor in world units.
    /// Zero accepts only exact range matches.
    #[serde(default = "defaults::sensor_std")]
    pub sensor_std: f64,

    /// Move particles through the transition model in the motion step.
    #[serde(default = "defaults::enabled")]
    pub diffuse_motion: bool,

    /// Resampling scheme.
    #[serde(default)]
    pub resampling: ResamplingStrategy,

    /// Random seed for deterministic behavior (0 for random).
    #[serde(default)]
    pub seed: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            particle_factor: defaults::particle_factor(),
            sensor_std: defaults::sensor_std(),
            diffuse_motion: defaults::enabled(),
            resampling: ResamplingStrategy::default(),
            seed: 0,
        }
    }
}

impl EstimatorConfig {
    /// Reject settings the filter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.particle_factor == 0 {
            return Err(MargaError::InvalidConfig(
                "estimator.particle_factor must be at least 1".to_string(),
            ));
        }
        if !(self.sensor_std.is_finite() && self.sensor_std >= 0.0) {
            return Err(MargaError::InvalidConfig(format!(
                "estimator.sensor_std must be finite and non-negative, got {}",
                self.sensor_std
            )));
        }
        Ok(())
    }
}

/// Filter diagnostics, refreshed every tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EstimatorState {
    /// Number of completed updates.
    pub ticks: u64,
    /// Effective number of particles after weighting.
    pub neff: f64,
    /// Largest normalized particle weight.
    pub max_weight: f64,
    /// Whether the last update fell back to uniform weights.
    pub uniform_fallback: bool,
}

/// Belief tracker for one other agent.
#[derive(Debug)]
pub struct Estimator {
    config: EstimatorConfig,
    transitions: Arc<TransitionModel>,
    /// World position of every cell center, row-major.
    centers: Vec<WorldPoint>,
    belief: BeliefGrid,
    particles: Vec<usize>,
    rng: StdRng,
    state: EstimatorState,
}

impl Estimator {
    /// Create an estimator with a uniform prior over the layout's grid.
    pub fn new(
        layout: &Layout,
        transitions: Arc<TransitionModel>,
        config: EstimatorConfig,
    ) -> Result<Self> {
        layout.validate()?;
        config.validate()?;
        if transitions.rows() != layout.rows || transitions.cols() != layout.cols {
            return Err(MargaError::InvalidTransition(format!(
                "table covers {}x{} but layout is {}x{}",
                transitions.rows(),
                transitions.cols(),
                layout.rows,
                layout.cols
            )));
        }

        let seed = if config.seed == 0 {
            rand::random()
        } else {
            config.seed
        };

        let centers = (0..layout.cell_count())
            .map(|i| layout.cell_to_world(layout.coord(i)))
            .collect();

        Ok(Self {
            particles: Self::initial_particles(layout.cell_count(), config.particle_factor),
            belief: BeliefGrid::uniform(layout.rows, layout.cols),
            rng: StdRng::seed_from_u64(seed),
            state: EstimatorState::default(),
            config,
            transitions,
            centers,
        })
    }

    /// Every cell repeated `factor` times.
    fn initial_particles(cells: usize, factor: usize) -> Vec<usize> {
        (0..cells)
            .flat_map(|cell| std::iter::repeat_n(cell, factor))
            .collect()
    }

    /// Get the configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Current belief.
    pub fn belief(&self) -> &BeliefGrid {
        &self.belief
    }

    /// Current particle set as flat cell indices.
    pub fn particles(&self) -> &[usize] {
        &self.particles
    }

    /// Get current filter state (for diagnostics).
    pub fn state(&self) -> &EstimatorState {
        &self.state
    }

    /// Return to the uniform prior and the deterministic initial particle set.
    pub fn reset(&mut self) {
        self.belief = BeliefGrid::uniform(self.belief.rows(), self.belief.cols());
        self.particles = Self::initial_particles(self.centers.len(), self.config.particle_factor);
        self.state = EstimatorState::default();
    }

    /// Fold one range observation into the belief.
    ///
    /// `observer` is the observing agent's world position. Parked agents never
    /// move, so the motion step is skipped for them.
    pub fn update_estimate(
        &mut self,
        observer: WorldPoint,
        measured_range: f32,
        is_parked: bool,
    ) -> &BeliefGrid {
        if !is_parked {
            self.motion_step();
        }

        let weights = self.observation_weights(observer, measured_range);
        self.resample(&weights);
        self.rebuild_belief();

        self.state.ticks += 1;
        trace!(
            "[Estimator] tick {}: neff={:.1} max_w={:.4} peak={}",
            self.state.ticks,
            self.state.neff,
            self.state.max_weight,
            self.belief.argmax()
        );

        &self.belief
    }

    /// Redraw particles from the belief, then diffuse them one step.
    fn motion_step(&mut self) {
        let n = self.particles.len();
        let Some(sampler) = WeightedSampler::new(self.belief.values())
            .or_else(|| WeightedSampler::uniform(self.belief.len()))
        else {
            return;
        };
        self.particles = sampler.sample_n(&mut self.rng, n);

        if !self.config.diffuse_motion {
            return;
        }

        for particle in &mut self.particles {
            let cell = self.belief.coord(*particle);
            // Pinned cells have no outgoing probability and stay put
            let Some(local) = self.transitions.local_distribution(cell) else {
                continue;
            };
            let Some(step) = WeightedSampler::new(&local) else {
                continue;
            };
            let target = cell.neighborhood_9()[step.sample(&mut self.rng)];
            if self.belief.contains(target) {
                *particle = target.row as usize * self.belief.cols() + target.col as usize;
            }
        }
    }

    /// Normalized importance weights for the current particle set.
    fn observation_weights(&mut self, observer: WorldPoint, measured_range: f32) -> Vec<f64> {
        let std = self.config.sensor_std;
        let range = measured_range as f64;

        let log_weights: Vec<f64> = self
            .particles
            .iter()
            .map(|&p| {
                let distance = observer.distance(&self.centers[p]) as f64;
                let error = distance - range;
                if std > 0.0 {
                    -0.5 * (error / std).powi(2)
                } else if error.abs() <= f32::EPSILON as f64 {
                    0.0
                } else {
                    f64::NEG_INFINITY
                }
            })
            .collect();

        // Log-sum-exp: subtract the max before exponentiating
        let max_log_weight = log_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let n = self.particles.len() as f64;
        if !max_log_weight.is_finite() {
            warn!(
                "[Estimator] all {} particles have zero likelihood for range {}, using uniform weights",
                self.particles.len(),
                measured_range
            );
            self.state.uniform_fallback = true;
            self.state.neff = n;
            self.state.max_weight = 1.0 / n;
            return vec![1.0 / n; self.particles.len()];
        }
        self.state.uniform_fallback = false;

        let mut weights: Vec<f64> = log_weights
            .iter()
            .map(|&lw| (lw - max_log_weight).exp())
            .collect();
        let sum: f64 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= sum);

        let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
        self.state.neff = if sum_sq > 1e-10 { 1.0 / sum_sq } else { 0.0 };
        self.state.max_weight = weights.iter().copied().fold(0.0, f64::max);

        weights
    }

    /// Same-size draw with replacement from the weighted particles.
    fn resample(&mut self, weights: &[f64]) {
        let n = self.particles.len();
        let picks = match self.config.resampling {
            ResamplingStrategy::Multinomial => {
                WeightedSampler::new(weights).map(|s| s.sample_n(&mut self.rng, n))
            }
            ResamplingStrategy::LowVariance => low_variance_resample(weights, n, &mut self.rng),
        };

        match picks {
            Some(picks) => {
                self.particles = picks.into_iter().map(|i| self.particles[i]).collect();
            }
            None => warn!("[Estimator] resampling failed, keeping current particles"),
        }
    }

    fn rebuild_belief(&mut self) {
        self.belief.clear();
        let values = self.belief.values_mut();
        for &p in &self.particles {
            values[p] += 1.0;
        }
        self.belief.normalize();
    }
}
