//! Belief grid: a probability distribution over grid cells for one tracked agent.

use crate::core::GridCoord;
use crate::error::{MargaError, Result};

/// Row-major `rows x cols` distribution of non-negative mass.
///
/// After [`normalize`](Self::normalize) the entries sum to 1. Accessors take
/// a [`GridCoord`]; coordinates off the grid are a caller bug and panic.
#[derive(Clone, Debug, PartialEq)]
pub struct BeliefGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl BeliefGrid {
    /// Uniform distribution over all cells.
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn uniform(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "belief grid must be non-empty");
        let n = rows * cols;
        Self {
            rows,
            cols,
            values: vec![1.0 / n as f64; n],
        }
    }

    /// All mass on a single cell.
    pub fn point_mass(rows: usize, cols: usize, cell: GridCoord) -> Self {
        let mut grid = Self::zeros(rows, cols);
        grid.set(cell, 1.0);
        grid
    }

    /// Build from raw row-major values (not normalized).
    pub fn from_values(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MargaError::InvalidGrid(format!(
                "belief grid must be non-empty, got {}x{}",
                rows, cols
            )));
        }
        if values.len() != rows * cols {
            return Err(MargaError::InvalidGrid(format!(
                "data length {} does not match grid size {}x{}",
                values.len(),
                rows,
                cols
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(MargaError::InvalidGrid(format!(
                "belief values must be finite and non-negative, got {}",
                bad
            )));
        }
        Ok(Self { rows, cols, values })
    }

    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "belief grid must be non-empty");
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Is the cell on this grid?
    #[inline]
    pub fn contains(&self, cell: GridCoord) -> bool {
        cell.in_bounds(self.rows, self.cols)
    }

    #[inline]
    fn index(&self, cell: GridCoord) -> usize {
        assert!(
            self.contains(cell),
            "cell {} out of range for {}x{} belief grid",
            cell,
            self.rows,
            self.cols
        );
        cell.row as usize * self.cols + cell.col as usize
    }

    /// Cell for a row-major flat index.
    #[inline]
    pub fn coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index / self.cols) as i32, (index % self.cols) as i32)
    }

    /// Mass at a cell.
    #[inline]
    pub fn get(&self, cell: GridCoord) -> f64 {
        self.values[self.index(cell)]
    }

    /// Overwrite the mass at a cell.
    #[inline]
    pub fn set(&mut self, cell: GridCoord, value: f64) {
        debug_assert!(value >= 0.0, "belief mass must be non-negative");
        let idx = self.index(cell);
        self.values[idx] = value;
    }

    /// Add `delta` to the mass at a cell.
    #[inline]
    pub fn add(&mut self, cell: GridCoord, delta: f64) {
        let idx = self.index(cell);
        self.values[idx] += delta;
        debug_assert!(self.values[idx] >= 0.0, "belief mass must be non-negative");
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Total mass.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Scale so that the mass sums to 1.
    ///
    /// A grid with zero (or non-finite) total mass carries no information and
    /// becomes uniform.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 && total.is_finite() {
            self.values.iter_mut().for_each(|v| *v /= total);
        } else {
            let uniform = 1.0 / self.values.len() as f64;
            self.values.iter_mut().for_each(|v| *v = uniform);
        }
    }

    /// Cell holding the most mass (first in row-major order on ties).
    pub fn argmax(&self) -> GridCoord {
        let mut best = 0;
        for (i, &v) in self.values.iter().enumerate() {
            if v > self.values[best] {
                best = i;
            }
        }
        self.coord(best)
    }

    /// Row-major view of the raw values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Iterate `(cell, mass)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.coord(i), v))
    }
}
