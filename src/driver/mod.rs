//! Per-tick driver: estimation, planning and the wait policy glued together.

mod agent;
mod checkpoints;
mod machine;

pub use agent::{Action, AgentBody, RangeObservation};
pub use checkpoints::CheckpointTracker;
pub use machine::{DriverConfig, LoopState, PlanningLoop};
