//! Map layout: grid dimensions, obstacles, checkpoints and coordinate conversion.
//!
//! The layout is the map collaborator's view of the world. The core reads it
//! once to build the [`WorldGraph`](crate::planning::WorldGraph) and uses its
//! conversions to move between world positions and grid cells.
//!
//! Cell `(row, col)` covers `[origin.x + col * tile, origin.x + (col + 1) * tile)`
//! horizontally and the same span in Y for `row`; its world position is the
//! cell center.

use serde::{Deserialize, Serialize};

use crate::core::{GridCoord, WorldPoint};
use crate::error::{MargaError, Result};

/// Axis-aligned obstacle rectangle in cell indices.
///
/// Convention: `[row_min, row_max) x [col_min, col_max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRect {
    pub row_min: i32,
    pub col_min: i32,
    pub row_max: i32,
    pub col_max: i32,
}

impl BlockRect {
    /// Create a new rectangle from half-open bounds.
    pub fn new(row_min: i32, col_min: i32, row_max: i32, col_max: i32) -> Self {
        Self {
            row_min,
            col_min,
            row_max,
            col_max,
        }
    }

    /// Does the rectangle cover this cell?
    #[inline]
    pub fn contains(&self, cell: GridCoord) -> bool {
        cell.row >= self.row_min
            && cell.row < self.row_max
            && cell.col >= self.col_min
            && cell.col < self.col_max
    }

    /// The rectangle grown by `margin` cells in every direction.
    pub fn inflated(&self, margin: i32) -> BlockRect {
        BlockRect::new(
            self.row_min - margin,
            self.col_min - margin,
            self.row_max + margin,
            self.col_max + margin,
        )
    }

    /// Does the rectangle cover no cells?
    pub fn is_empty(&self) -> bool {
        self.row_min >= self.row_max || self.col_min >= self.col_max
    }

    /// All cells covered by the rectangle, row-major.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (self.row_min..self.row_max)
            .flat_map(move |row| (self.col_min..self.col_max).map(move |col| GridCoord::new(row, col)))
    }
}

/// Grid world description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// Side length of a cell in world units
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// World coordinates of the corner of cell (0, 0)
    #[serde(default)]
    pub origin: WorldPoint,
    /// Static obstacles
    #[serde(default)]
    pub blocks: Vec<BlockRect>,
    /// Ordered goal cells
    #[serde(default)]
    pub checkpoints: Vec<GridCoord>,
}

fn default_tile_size() -> f32 {
    1.0
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            tile_size: default_tile_size(),
            origin: WorldPoint::ZERO,
            blocks: Vec::new(),
            checkpoints: Vec::new(),
        }
    }
}

impl Layout {
    /// Create an obstacle-free layout with unit tiles.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Add an obstacle rectangle.
    pub fn with_block(mut self, block: BlockRect) -> Self {
        self.blocks.push(block);
        self
    }

    /// Set the checkpoint sequence.
    pub fn with_checkpoints(mut self, checkpoints: Vec<GridCoord>) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    /// Set the tile size.
    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Check dimensions, tile size, and that checkpoints are free cells.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(MargaError::InvalidLayout(format!(
                "grid must be non-empty, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.rows > i32::MAX as usize || self.cols > i32::MAX as usize {
            return Err(MargaError::InvalidLayout(format!(
                "grid {}x{} exceeds addressable size",
                self.rows, self.cols
            )));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(MargaError::InvalidLayout(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }
        for (i, checkpoint) in self.checkpoints.iter().enumerate() {
            if !self.contains(*checkpoint) {
                return Err(MargaError::InvalidLayout(format!(
                    "checkpoint {} at {} is outside the {}x{} grid",
                    i, checkpoint, self.rows, self.cols
                )));
            }
            if self.is_blocked(*checkpoint) {
                return Err(MargaError::InvalidLayout(format!(
                    "checkpoint {} at {} lies inside an obstacle",
                    i, checkpoint
                )));
            }
        }
        Ok(())
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Is the cell on the grid?
    #[inline]
    pub fn contains(&self, cell: GridCoord) -> bool {
        cell.in_bounds(self.rows, self.cols)
    }

    /// Is the cell covered by any obstacle rectangle?
    pub fn is_blocked(&self, cell: GridCoord) -> bool {
        self.blocks.iter().any(|b| b.contains(cell))
    }

    /// Is the cell on the outermost row or column?
    #[inline]
    pub fn is_border(&self, cell: GridCoord) -> bool {
        cell.row == 0
            || cell.col == 0
            || cell.row as usize == self.rows - 1
            || cell.col as usize == self.cols - 1
    }

    /// Row-major flat index, if the cell is on the grid.
    #[inline]
    pub fn index(&self, cell: GridCoord) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.row as usize * self.cols + cell.col as usize)
    }

    /// Cell for a row-major flat index.
    #[inline]
    pub fn coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index / self.cols) as i32, (index % self.cols) as i32)
    }

    /// World position of a cell center.
    #[inline]
    pub fn cell_to_world(&self, cell: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (cell.col as f32 + 0.5) * self.tile_size,
            self.origin.y + (cell.row as f32 + 0.5) * self.tile_size,
        )
    }

    /// Cell containing a world position. May lie off the grid.
    #[inline]
    pub fn world_to_cell(&self, point: WorldPoint) -> GridCoord {
        let col = ((point.x - self.origin.x) / self.tile_size).floor() as i32;
        let row = ((point.y - self.origin.y) / self.tile_size).floor() as i32;
        GridCoord::new(row, col)
    }

    /// Cell containing a world position, clamped onto the grid.
    pub fn world_to_cell_clamped(&self, point: WorldPoint) -> GridCoord {
        let cell = self.world_to_cell(point);
        GridCoord::new(
            cell.row.clamp(0, self.rows as i32 - 1),
            cell.col.clamp(0, self.cols as i32 - 1),
        )
    }
}
