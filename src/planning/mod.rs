//! Risk-aware path planning.
//!
//! The [`WorldGraph`] is built once per layout and shared. Each call to
//! [`RiskPlanner::plan_next_step`] derives an [`OccupancyMap`] from the other
//! agents' beliefs and prices edges with it while searching.

mod dijkstra;
mod graph;
mod occupancy;
mod planner;

pub use dijkstra::{DijkstraResult, DijkstraState, dijkstra};
pub use graph::{UNIT_COST, WorldGraph};
pub use occupancy::{OccupancyMap, SpreadKernel};
pub use planner::{OtherAgent, PlanError, PlanRequest, PlannerConfig, RiskPlanner, StepPlan};
