//! Test utilities for Marga integration tests.
//!
//! Layouts, beliefs and a simple simulated body.

#![allow(dead_code)]

use std::sync::Arc;

use marga::core::{GridCoord, WorldPoint};
use marga::estimation::{BeliefGrid, Estimator, EstimatorConfig, TransitionModel};
use marga::{AgentBody, BlockRect, Layout, PlannerConfig, RiskPlanner};

/// Install a test logger once.
pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// 10x10 world with one 2x2 obstacle away from the center.
pub fn scenario_layout() -> Layout {
    Layout::new(10, 10)
        .with_block(BlockRect::new(2, 6, 4, 8))
        .with_checkpoints(vec![GridCoord::new(9, 9)])
}

/// Planner with default tuning and a stationary transition model.
pub fn planner_for(layout: &Layout) -> RiskPlanner {
    let model = Arc::new(TransitionModel::stationary(layout.rows, layout.cols).unwrap());
    RiskPlanner::new(layout, model, PlannerConfig::default()).unwrap()
}

/// Seeded estimator over an open grid.
pub fn seeded_estimator(layout: &Layout, model: TransitionModel, seed: u64) -> Estimator {
    let config = EstimatorConfig {
        seed,
        sensor_std: 0.5,
        ..Default::default()
    };
    Estimator::new(layout, Arc::new(model), config).unwrap()
}

/// Exact distance between two cell centers.
pub fn exact_range(layout: &Layout, from: WorldPoint, target: GridCoord) -> f32 {
    from.distance(&layout.cell_to_world(target))
}

pub fn point_mass(layout: &Layout, cell: GridCoord) -> BeliefGrid {
    BeliefGrid::point_mass(layout.rows, layout.cols, cell)
}

/// Kinematic body on unit tiles: turns instantly, drives one tile per tick
/// and settles on the center of the tile it lands in.
#[derive(Debug)]
pub struct SimBody {
    pub position: WorldPoint,
    pub heading: f32,
    pub speed: f32,
    pub moves: usize,
}

impl SimBody {
    pub fn new(position: WorldPoint, heading: f32) -> Self {
        Self {
            position,
            heading,
            speed: 1.0,
            moves: 0,
        }
    }
}

impl AgentBody for SimBody {
    fn current_position(&self) -> WorldPoint {
        self.position
    }

    fn current_heading(&self) -> f32 {
        self.heading
    }

    fn apply_action(&mut self, steer: f32, throttle: f32) {
        self.heading = marga::core::normalize_angle(self.heading + steer);
        if throttle <= 0.0 {
            return;
        }
        let moved = self.position
            + WorldPoint::new(self.heading.cos(), self.heading.sin()) * (self.speed * throttle);
        self.position = WorldPoint::new(moved.x.floor() + 0.5, moved.y.floor() + 0.5);
        self.moves += 1;
    }
}
