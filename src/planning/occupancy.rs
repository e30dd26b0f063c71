//! Occupancy likelihood map: where other agents probably are this tick.
//!
//! Each agent's belief is spread over nearby cells with a [`SpreadKernel`]
//! (wider for parked agents) and summed. The result is normalized to total
//! mass 1, or left all-zero when no agent contributed.

use serde::{Deserialize, Serialize};

use crate::core::GridCoord;
use crate::estimation::BeliefGrid;

/// Spread weights by Chebyshev distance from the source cell.
///
/// `rings[d]` multiplies the source mass for every cell at distance `d`.
/// `rings[0]` is the weight of the source cell itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpreadKernel {
    pub rings: Vec<f64>,
}

impl SpreadKernel {
    pub fn new(rings: Vec<f64>) -> Self {
        Self { rings }
    }

    /// Wide kernel for parked agents: own mass plus 0.5 within radius 1, 0.2 at radius 2.
    pub fn parked() -> Self {
        Self::new(vec![1.5, 0.5, 0.2])
    }

    /// Narrow kernel for moving agents: own mass plus 0.2 within radius 1.
    pub fn moving() -> Self {
        Self::new(vec![1.2, 0.2])
    }

    /// Largest distance with a weight.
    pub fn radius(&self) -> usize {
        self.rings.len().saturating_sub(1)
    }

    /// Weight at a Chebyshev distance (0 beyond the radius).
    pub fn weight(&self, distance: usize) -> f64 {
        self.rings.get(distance).copied().unwrap_or(0.0)
    }

    /// True if every weight is finite and non-negative and at least one is positive.
    pub fn is_valid(&self) -> bool {
        self.rings.iter().all(|w| w.is_finite() && *w >= 0.0) && self.rings.iter().any(|w| *w > 0.0)
    }
}

/// Per-tick likelihood that each cell is occupied by some other agent.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyMap {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl OccupancyMap {
    /// All-zero map.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, cell: GridCoord) -> usize {
        assert!(
            cell.in_bounds(self.rows, self.cols),
            "cell {} out of range for {}x{} occupancy map",
            cell,
            self.rows,
            self.cols
        );
        cell.row as usize * self.cols + cell.col as usize
    }

    /// Likelihood at a cell.
    pub fn get(&self, cell: GridCoord) -> f64 {
        self.values[self.index(cell)]
    }

    /// Total mass (1 after normalization unless the map is empty).
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Add one agent's belief spread with `kernel`.
    pub fn accumulate(&mut self, belief: &BeliefGrid, kernel: &SpreadKernel) {
        debug_assert_eq!((belief.rows(), belief.cols()), (self.rows, self.cols));
        let radius = kernel.radius() as i32;

        for (cell, mass) in belief.iter() {
            if mass <= 0.0 {
                continue;
            }
            for dr in -radius..=radius {
                for dc in -radius..=radius {
                    let target = GridCoord::new(cell.row + dr, cell.col + dc);
                    if !target.in_bounds(self.rows, self.cols) {
                        continue;
                    }
                    let distance = dr.abs().max(dc.abs()) as usize;
                    let idx = target.row as usize * self.cols + target.col as usize;
                    self.values[idx] += mass * kernel.weight(distance);
                }
            }
        }
    }

    /// Scale to total mass 1. An all-zero map stays all-zero.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 && total.is_finite() {
            self.values.iter_mut().for_each(|v| *v /= total);
        }
    }
}
