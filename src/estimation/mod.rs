//! Occupancy estimation for other agents.
//!
//! - [`BeliefGrid`]: normalized distribution over cells
//! - [`TransitionModel`]: shared one-step motion table
//! - [`Estimator`]: particle filter fusing range readings into a belief

mod belief;
mod particle_filter;
mod transition;

pub use belief::BeliefGrid;
pub use particle_filter::{Estimator, EstimatorConfig, EstimatorState};
pub use transition::{STAY_SLOT, TransitionModel};
