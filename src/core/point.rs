//! Cell and world coordinate types.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Grid coordinates (integer cell indices).
///
/// Signed so that neighbor arithmetic at the grid border stays well-defined;
/// whether a coordinate lies on the grid is checked against its dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    /// Row index (world Y axis)
    pub row: i32,
    /// Column index (world X axis)
    pub col: i32,
}

impl GridCoord {
    /// Create a new grid coordinate
    #[inline]
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another coordinate
    #[inline]
    pub fn manhattan_distance(&self, other: &GridCoord) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// Chebyshev distance (max of row and column distance)
    #[inline]
    pub fn chebyshev_distance(&self, other: &GridCoord) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// Is this coordinate inside a `rows x cols` grid?
    #[inline]
    pub fn in_bounds(&self, rows: usize, cols: usize) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < rows && (self.col as usize) < cols
    }

    /// The 4 orthogonal neighbors (up, down, left, right in row/col space)
    #[inline]
    pub fn neighbors_4(&self) -> [GridCoord; 4] {
        [
            GridCoord::new(self.row, self.col - 1),
            GridCoord::new(self.row, self.col + 1),
            GridCoord::new(self.row - 1, self.col),
            GridCoord::new(self.row + 1, self.col),
        ]
    }

    /// The 3x3 neighborhood in fixed slot order, including the cell itself.
    ///
    /// Slot `k` holds offset `(k / 3 - 1, k % 3 - 1)`, so slot 4 is "stay".
    /// The transition table uses the same ordering.
    #[inline]
    pub fn neighborhood_9(&self) -> [GridCoord; 9] {
        let mut out = [*self; 9];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = GridCoord::new(self.row + k as i32 / 3 - 1, self.col + k as i32 % 3 - 1);
        }
        out
    }

    /// Slot of `other` in this cell's 3x3 neighborhood, if adjacent (or equal).
    #[inline]
    pub fn neighborhood_slot(&self, other: &GridCoord) -> Option<usize> {
        let dr = other.row - self.row;
        let dc = other.col - self.col;
        if dr.abs() > 1 || dc.abs() > 1 {
            return None;
        }
        Some(((dr + 1) * 3 + (dc + 1)) as usize)
    }
}

impl Add for GridCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        GridCoord::new(self.row + other.row, self.col + other.col)
    }
}

impl Sub for GridCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        GridCoord::new(self.row - other.row, self.col - other.col)
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// World coordinates (continuous, f32)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// X coordinate (grows with column index)
    pub x: f32,
    /// Y coordinate (grows with row index)
    pub y: f32,
}

impl WorldPoint {
    /// Create a new world point
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero point (origin)
    pub const ZERO: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Angle from this point to another (radians, CCW from +X)
    #[inline]
    pub fn angle_to(&self, other: &WorldPoint) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Length of this point as a vector from origin
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for WorldPoint {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        WorldPoint::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for WorldPoint {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        WorldPoint::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for WorldPoint {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        WorldPoint::new(self.x * scalar, self.y * scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_coord_neighbors() {
        let c = GridCoord::new(5, 5);
        let n4 = c.neighbors_4();
        assert_eq!(n4[0], GridCoord::new(5, 4));
        assert_eq!(n4[1], GridCoord::new(5, 6));
        assert_eq!(n4[2], GridCoord::new(4, 5));
        assert_eq!(n4[3], GridCoord::new(6, 5));
    }

    #[test]
    fn test_neighborhood_slots() {
        let c = GridCoord::new(2, 3);
        let n9 = c.neighborhood_9();
        assert_eq!(n9[0], GridCoord::new(1, 2));
        assert_eq!(n9[4], c);
        assert_eq!(n9[8], GridCoord::new(3, 4));

        for (k, cell) in n9.iter().enumerate() {
            assert_eq!(c.neighborhood_slot(cell), Some(k));
        }
        assert_eq!(c.neighborhood_slot(&GridCoord::new(4, 3)), None);
    }

    #[test]
    fn test_in_bounds() {
        assert!(GridCoord::new(0, 0).in_bounds(3, 4));
        assert!(GridCoord::new(2, 3).in_bounds(3, 4));
        assert!(!GridCoord::new(3, 0).in_bounds(3, 4));
        assert!(!GridCoord::new(0, -1).in_bounds(3, 4));
    }

    #[test]
    fn test_distances() {
        let a = GridCoord::new(0, 0);
        let b = GridCoord::new(2, 5);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_eq!(a.chebyshev_distance(&b), 5);
    }

    #[test]
    fn test_world_point_distance() {
        let a = WorldPoint::new(0.0, 0.0);
        let b = WorldPoint::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_world_point_angle() {
        let origin = WorldPoint::ZERO;
        let east = WorldPoint::new(1.0, 0.0);
        let north = WorldPoint::new(0.0, 1.0);

        assert!((origin.angle_to(&east) - 0.0).abs() < 1e-6);
        assert!((origin.angle_to(&north) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
