//! Ordered checkpoint progress.

use log::info;

use crate::core::GridCoord;

/// Tracks which checkpoint the agent is heading to.
///
/// Reaching the current checkpoint moves on to the next. After the last one
/// the tracker keeps pointing at it.
#[derive(Clone, Debug, Default)]
pub struct CheckpointTracker {
    checkpoints: Vec<GridCoord>,
    index: usize,
    visited: usize,
}

impl CheckpointTracker {
    pub fn new(checkpoints: Vec<GridCoord>) -> Self {
        Self {
            checkpoints,
            index: 0,
            visited: 0,
        }
    }

    /// Checkpoint currently targeted, if there are any.
    pub fn current(&self) -> Option<GridCoord> {
        self.checkpoints.get(self.index).copied()
    }

    /// Number of checkpoints reached so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// True once every checkpoint has been reached.
    pub fn is_complete(&self) -> bool {
        !self.checkpoints.is_empty() && self.visited == self.checkpoints.len()
    }

    /// Record the agent's cell. Returns true if a checkpoint was reached.
    pub fn update(&mut self, cell: GridCoord) -> bool {
        if self.is_complete() || self.current() != Some(cell) {
            return false;
        }

        self.visited += 1;
        info!(
            "[Loop] checkpoint {}/{} reached at {}",
            self.visited,
            self.checkpoints.len(),
            cell
        );
        if self.index + 1 < self.checkpoints.len() {
            self.index += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_in_order() {
        let a = GridCoord::new(0, 1);
        let b = GridCoord::new(2, 2);
        let mut tracker = CheckpointTracker::new(vec![a, b]);

        assert_eq!(tracker.current(), Some(a));
        assert!(!tracker.update(b));
        assert!(tracker.update(a));
        assert_eq!(tracker.current(), Some(b));
        assert!(tracker.update(b));
        assert!(tracker.is_complete());

        // Stays on the last one
        assert_eq!(tracker.current(), Some(b));
        assert!(!tracker.update(b));
        assert_eq!(tracker.visited(), 2);
    }

    #[test]
    fn test_empty() {
        let mut tracker = CheckpointTracker::default();
        assert_eq!(tracker.current(), None);
        assert!(!tracker.update(GridCoord::new(0, 0)));
        assert!(!tracker.is_complete());
    }
}
