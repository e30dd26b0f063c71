//! # Marga: Risk-Aware Grid Navigation
//!
//! Marga steers one agent through a grid world shared with other agents that
//! it can only observe through noisy range readings.
//!
//! ## Features
//!
//! - **Particle Filter Estimation**: one belief grid per other agent, updated
//!   from range readings and a learned one-step transition model
//! - **Risk-Weighted Planning**: Dijkstra over a static grid graph whose edges
//!   are priced each tick by the estimated occupancy of other agents
//! - **Wait Policy**: per-step wait budgets near parked or likely-occupied
//!   cells, with a tick accumulator that eventually moves on
//! - **YAML Configuration**: layout, estimator, planner and loop settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use marga::{MargaConfig, PlanningLoop, RangeObservation, TransitionModel};
//! use marga::core::WorldPoint;
//!
//! let config = MargaConfig::load_default()?;
//! let transitions = Arc::new(TransitionModel::uniform_neighbors(
//!     config.layout.rows,
//!     config.layout.cols,
//! )?);
//! let mut driver = PlanningLoop::from_config(&config, transitions, 1)?;
//!
//! let me = WorldPoint::new(0.5, 0.5);
//! let seen = [RangeObservation::new(me, 4.2, false)];
//! if let Some(action) = driver.tick(me, 0.0, &seen) {
//!     println!("go to ({:.1}, {:.1}), advance={}", action.waypoint.x, action.waypoint.y, action.advance);
//! }
//! # Ok::<(), marga::MargaError>(())
//! ```
//!
//! ## Data Flow
//!
//! ```text
//!   RangeObservation ──► Estimator ──► BeliefGrid (per other agent)
//!                                          │
//!                                          ▼
//!   Layout ──► WorldGraph ──────────► RiskPlanner ──► StepPlan
//!                                          ▲              │
//!   TransitionModel ───────────────────────┘              ▼
//!                                                   PlanningLoop ──► Action ──► AgentBody
//! ```
//!
//! ## Coordinate Frame
//!
//! Cells are `(row, col)`. World X grows with column and world Y with row;
//! a cell's world position is its center.

pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod estimation;
pub mod io;
pub mod layout;
pub mod planning;

// Re-export main types at crate root
pub use config::MargaConfig;
pub use driver::{Action, AgentBody, DriverConfig, LoopState, PlanningLoop, RangeObservation};
pub use error::{MargaError, Result};
pub use estimation::{BeliefGrid, Estimator, EstimatorConfig, TransitionModel};
pub use layout::{BlockRect, Layout};
pub use planning::{
    PlanError, PlanRequest, PlannerConfig, RiskPlanner, StepPlan, WorldGraph,
};
