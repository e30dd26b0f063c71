//! Sparse one-step transition model between neighboring cells.
//!
//! Each source cell maps to the 9 cells of its 3x3 neighborhood (the 8
//! neighbors plus "stay"), in the slot order of
//! [`GridCoord::neighborhood_9`]. Pairs that were never given a probability
//! are 0. A cell whose 9 probabilities are all 0 is *pinned*: an agent there
//! is assumed to stay put.
//!
//! The model is built once and never mutated. Share it with `Arc`.

use std::collections::{HashMap, HashSet};

use crate::core::GridCoord;
use crate::error::{MargaError, Result};

use super::belief::BeliefGrid;

/// Index of the "stay" slot in a 3x3 neighborhood.
pub const STAY_SLOT: usize = 4;

/// Read-only table of one-step motion probabilities.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionModel {
    rows: usize,
    cols: usize,
    table: HashMap<GridCoord, [f64; 9]>,
}

impl TransitionModel {
    /// Build from `(from, to, probability)` entries.
    ///
    /// Rejects cells off the `rows x cols` grid, pairs that are not within one
    /// cell of each other, probabilities outside `[0, 1]`, and duplicate pairs.
    pub fn from_entries<I>(rows: usize, cols: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (GridCoord, GridCoord, f64)>,
    {
        if rows == 0 || cols == 0 {
            return Err(MargaError::InvalidTransition(format!(
                "grid must be non-empty, got {}x{}",
                rows, cols
            )));
        }

        let mut table: HashMap<GridCoord, [f64; 9]> = HashMap::new();
        let mut seen: HashSet<(GridCoord, usize)> = HashSet::new();

        for (from, to, p) in entries {
            if !from.in_bounds(rows, cols) || !to.in_bounds(rows, cols) {
                return Err(MargaError::InvalidTransition(format!(
                    "pair {} -> {} lies outside the {}x{} grid",
                    from, to, rows, cols
                )));
            }
            let slot = from.neighborhood_slot(&to).ok_or_else(|| {
                MargaError::InvalidTransition(format!("cells {} and {} are not adjacent", from, to))
            })?;
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(MargaError::InvalidTransition(format!(
                    "probability {} for {} -> {} is outside [0, 1]",
                    p, from, to
                )));
            }
            if !seen.insert((from, slot)) {
                return Err(MargaError::InvalidTransition(format!(
                    "duplicate entry for {} -> {}",
                    from, to
                )));
            }
            table.entry(from).or_insert([0.0; 9])[slot] = p;
        }

        Ok(Self { rows, cols, table })
    }

    /// Every cell moves to each of its on-grid 3x3 neighbors (stay included)
    /// with equal probability.
    pub fn uniform_neighbors(rows: usize, cols: usize) -> Result<Self> {
        let mut entries = Vec::with_capacity(rows * cols * 9);
        for row in 0..rows as i32 {
            for col in 0..cols as i32 {
                let from = GridCoord::new(row, col);
                let targets: Vec<GridCoord> = from
                    .neighborhood_9()
                    .into_iter()
                    .filter(|c| c.in_bounds(rows, cols))
                    .collect();
                let p = 1.0 / targets.len() as f64;
                entries.extend(targets.into_iter().map(|to| (from, to, p)));
            }
        }
        Self::from_entries(rows, cols, entries)
    }

    /// Every cell stays put with probability 1.
    pub fn stationary(rows: usize, cols: usize) -> Result<Self> {
        let entries = (0..rows as i32)
            .flat_map(|row| (0..cols as i32).map(move |col| GridCoord::new(row, col)))
            .map(|cell| (cell, cell, 1.0));
        Self::from_entries(rows, cols, entries)
    }

    /// Number of rows of the grid this model covers.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns of the grid this model covers.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of source cells with at least one entry.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Probability of moving from `from` to `to` in one step.
    pub fn probability(&self, from: GridCoord, to: GridCoord) -> f64 {
        match (self.table.get(&from), from.neighborhood_slot(&to)) {
            (Some(slots), Some(slot)) => slots[slot],
            _ => 0.0,
        }
    }

    /// Raw probabilities for the 9 neighborhood slots of `from`.
    pub fn neighbor_probabilities(&self, from: GridCoord) -> [f64; 9] {
        self.table.get(&from).copied().unwrap_or([0.0; 9])
    }

    /// Normalized 9-slot distribution for `from`, or `None` if the cell is pinned.
    pub fn local_distribution(&self, from: GridCoord) -> Option<[f64; 9]> {
        let mut probs = self.neighbor_probabilities(from);
        let total: f64 = probs.iter().sum();
        if total <= 0.0 {
            return None;
        }
        probs.iter_mut().for_each(|p| *p /= total);
        Some(probs)
    }

    /// Exact one-step prediction of a belief grid.
    ///
    /// Mass on pinned cells stays where it is. The result is normalized.
    pub fn predict(&self, belief: &BeliefGrid) -> BeliefGrid {
        let mut next = BeliefGrid::zeros(belief.rows(), belief.cols());
        for (cell, mass) in belief.iter() {
            if mass <= 0.0 {
                continue;
            }
            match self.local_distribution(cell) {
                Some(dist) => {
                    for (target, p) in cell.neighborhood_9().into_iter().zip(dist) {
                        if p > 0.0 && next.contains(target) {
                            next.add(target, mass * p);
                        }
                    }
                }
                None => next.add(cell, mass),
            }
        }
        next.normalize();
        next
    }

    /// All non-zero `(from, to, probability)` entries, sorted for stable output.
    pub fn entries(&self) -> Vec<(GridCoord, GridCoord, f64)> {
        let mut out: Vec<_> = self
            .table
            .iter()
            .flat_map(|(from, slots)| {
                from.neighborhood_9()
                    .into_iter()
                    .zip(*slots)
                    .filter(|(_, p)| *p > 0.0)
                    .map(move |(to, p)| (*from, to, p))
            })
            .collect();
        out.sort_by_key(|(from, to, _)| (from.row, from.col, to.row, to.col));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_entries_and_lookup() {
        let a = GridCoord::new(1, 1);
        let model = TransitionModel::from_entries(
            3,
            3,
            vec![(a, a, 0.5), (a, GridCoord::new(1, 2), 0.25)],
        )
        .unwrap();

        assert_eq!(model.probability(a, a), 0.5);
        assert_eq!(model.probability(a, GridCoord::new(1, 2)), 0.25);
        assert_eq!(model.probability(a, GridCoord::new(0, 0)), 0.0);
        assert_eq!(model.probability(GridCoord::new(0, 0), a), 0.0);

        let dist = model.local_distribution(a).unwrap();
        assert_relative_eq!(dist[STAY_SLOT], 2.0 / 3.0);
        assert!(model.local_distribution(GridCoord::new(0, 0)).is_none());
    }

    #[test]
    fn test_rejects_bad_entries() {
        let a = GridCoord::new(0, 0);
        assert!(TransitionModel::from_entries(3, 3, vec![(a, GridCoord::new(2, 0), 0.5)]).is_err());
        assert!(TransitionModel::from_entries(3, 3, vec![(a, GridCoord::new(-1, 0), 0.5)]).is_err());
        assert!(TransitionModel::from_entries(3, 3, vec![(a, a, 1.5)]).is_err());
        assert!(TransitionModel::from_entries(3, 3, vec![(a, a, f64::NAN)]).is_err());
        assert!(TransitionModel::from_entries(3, 3, vec![(a, a, 0.5), (a, a, 0.5)]).is_err());
    }

    #[test]
    fn test_uniform_neighbors() {
        let model = TransitionModel::uniform_neighbors(3, 3).unwrap();
        // Corner has 4 on-grid targets, center has 9
        assert_relative_eq!(model.probability(GridCoord::new(0, 0), GridCoord::new(1, 1)), 0.25);
        assert_relative_eq!(
            model.probability(GridCoord::new(1, 1), GridCoord::new(0, 0)),
            1.0 / 9.0
        );
    }

    #[test]
    fn test_predict_conserves_mass() {
        let model = TransitionModel::uniform_neighbors(4, 4).unwrap();
        let belief = BeliefGrid::point_mass(4, 4, GridCoord::new(1, 1));
        let next = model.predict(&belief);

        assert_relative_eq!(next.total(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(next.get(GridCoord::new(0, 0)), 1.0 / 9.0, epsilon = 1e-12);
        assert_eq!(next.get(GridCoord::new(3, 3)), 0.0);
    }

    #[test]
    fn test_predict_keeps_pinned_mass() {
        let model = TransitionModel::from_entries(3, 3, Vec::new()).unwrap();
        let belief = BeliefGrid::point_mass(3, 3, GridCoord::new(2, 0));
        let next = model.predict(&belief);
        assert_eq!(next, belief);
    }

    #[test]
    fn test_entries_sorted() {
        let model = TransitionModel::stationary(2, 2).unwrap();
        let entries = model.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].0, GridCoord::new(0, 0));
        assert_eq!(entries[3].1, GridCoord::new(1, 1));
    }
}
