//! Static traversability graph built from a [`Layout`].
//!
//! Nodes are the cells outside every obstacle rectangle. Each node links to
//! its 4-connected node neighbors with a base cost: 1 into a normal cell,
//! `1 + padding_surcharge` into a padded cell. Padded cells are the one-cell
//! ring around each obstacle (corners included) and the grid border.
//!
//! The graph never changes after [`WorldGraph::build`]. Per-tick risk is kept
//! separately and added to the base cost at query time.

use crate::core::GridCoord;
use crate::error::{MargaError, Result};
use crate::layout::Layout;

/// Base cost of an edge into a normal cell.
pub const UNIT_COST: f64 = 1.0;

/// Immutable grid graph with static base costs.
#[derive(Clone, Debug)]
pub struct WorldGraph {
    rows: usize,
    cols: usize,
    /// Traversable flag per cell, row-major
    nodes: Vec<bool>,
    /// Padding flag per cell, row-major
    padded: Vec<bool>,
    /// Adjacency list: edges[i] = [(neighbor_idx, base_cost), ...]
    edges: Vec<Vec<(usize, f64)>>,
    padding_surcharge: f64,
}

impl WorldGraph {
    /// Build the graph for a layout.
    pub fn build(layout: &Layout, padding_surcharge: f64) -> Result<Self> {
        layout.validate()?;
        if !(padding_surcharge.is_finite() && padding_surcharge > 0.0) {
            return Err(MargaError::InvalidConfig(format!(
                "padding surcharge must be positive, got {}",
                padding_surcharge
            )));
        }

        let (rows, cols) = (layout.rows, layout.cols);
        let n = layout.cell_count();

        let nodes: Vec<bool> = (0..n).map(|i| !layout.is_blocked(layout.coord(i))).collect();

        let mut padded = vec![false; n];
        for block in &layout.blocks {
            for cell in block.inflated(1).cells() {
                if let Some(i) = layout.index(cell) {
                    padded[i] |= nodes[i];
                }
            }
        }
        for (i, flag) in padded.iter_mut().enumerate() {
            if nodes[i] && layout.is_border(layout.coord(i)) {
                *flag = true;
            }
        }

        let edges = (0..n)
            .map(|i| {
                if !nodes[i] {
                    return Vec::new();
                }
                layout
                    .coord(i)
                    .neighbors_4()
                    .into_iter()
                    .filter_map(|nb| layout.index(nb))
                    .filter(|&j| nodes[j])
                    .map(|j| {
                        let cost = if padded[j] {
                            UNIT_COST + padding_surcharge
                        } else {
                            UNIT_COST
                        };
                        (j, cost)
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            rows,
            cols,
            nodes,
            padded,
            edges,
            padding_surcharge,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Surcharge added to edges into padded cells.
    pub fn padding_surcharge(&self) -> f64 {
        self.padding_surcharge
    }

    /// Number of traversable cells.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|&&n| n).count()
    }

    /// Row-major index of an on-grid cell.
    #[inline]
    pub fn index(&self, cell: GridCoord) -> Option<usize> {
        cell.in_bounds(self.rows, self.cols)
            .then(|| cell.row as usize * self.cols + cell.col as usize)
    }

    /// Cell for a row-major index.
    #[inline]
    pub fn coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index / self.cols) as i32, (index % self.cols) as i32)
    }

    /// Is the cell a traversable node?
    #[inline]
    pub fn is_node(&self, cell: GridCoord) -> bool {
        self.index(cell).is_some_and(|i| self.nodes[i])
    }

    /// Is the cell on an obstacle padding ring or the border?
    #[inline]
    pub fn is_padded(&self, cell: GridCoord) -> bool {
        self.index(cell).is_some_and(|i| self.padded[i])
    }

    /// Outgoing edges of every cell, indexed row-major.
    pub fn adjacency(&self) -> &[Vec<(usize, f64)>] {
        &self.edges
    }

    /// Base cost of the edge `from -> to`, if it exists.
    pub fn base_cost(&self, from: GridCoord, to: GridCoord) -> Option<f64> {
        let (i, j) = (self.index(from)?, self.index(to)?);
        self.edges[i]
            .iter()
            .find(|(target, _)| *target == j)
            .map(|(_, cost)| *cost)
    }

    /// Node neighbors of a cell.
    pub fn neighbors(&self, cell: GridCoord) -> Vec<GridCoord> {
        match self.index(cell) {
            Some(i) => self.edges[i].iter().map(|(j, _)| self.coord(*j)).collect(),
            None => Vec::new(),
        }
    }

    /// 4-neighbors that are not nodes: obstacle cells or off-grid cells.
    pub fn contours(&self, cell: GridCoord) -> Vec<GridCoord> {
        cell.neighbors_4()
            .into_iter()
            .filter(|nb| !self.is_node(*nb))
            .collect()
    }
}
