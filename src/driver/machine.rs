//! Tick-driven planning loop.
//!
//! Every tick walks the same stages:
//!
//! ```text
//! Idle { remaining } --burn-in over--> Estimating -> Planning -> Deciding
//!                                          ^                        |
//!                                          +------ next tick -------+
//! ```
//!
//! During burn-in the estimators still consume observations so their beliefs
//! have converged by the time the agent starts to move.

use std::sync::Arc;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::{MargaConfig, defaults};
use crate::core::{GridCoord, Pose2D, WorldPoint};
use crate::error::Result;
use crate::estimation::{Estimator, EstimatorConfig, TransitionModel};
use crate::layout::Layout;
use crate::planning::{OtherAgent, PlanRequest, RiskPlanner, StepPlan};

use super::agent::{Action, AgentBody, RangeObservation};
use super::checkpoints::CheckpointTracker;

/// Loop timing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Ticks spent estimating before the first action.
    #[serde(default = "defaults::burn_in_ticks")]
    pub burn_in_ticks: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            burn_in_ticks: defaults::burn_in_ticks(),
        }
    }
}

/// Stage of the planning loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Burn-in: observing only
    Idle {
        /// Ticks left before the first action
        remaining: u32,
    },
    /// Folding observations into beliefs
    Estimating,
    /// Searching for the next step
    Planning,
    /// Applying the wait accumulator
    Deciding,
}

impl LoopState {
    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            LoopState::Idle { .. } => "Idle",
            LoopState::Estimating => "Estimating",
            LoopState::Planning => "Planning",
            LoopState::Deciding => "Deciding",
        }
    }
}

/// Estimators, planner and wait bookkeeping for one controlled agent.
pub struct PlanningLoop {
    state: LoopState,
    planner: RiskPlanner,
    estimators: Vec<Estimator>,
    parked: Vec<bool>,
    checkpoints: CheckpointTracker,
    waiting_ticks: u32,
    last_plan: Option<StepPlan>,
}

impl PlanningLoop {
    /// Create a loop tracking one estimator per other agent.
    pub fn new(planner: RiskPlanner, estimators: Vec<Estimator>, config: DriverConfig) -> Self {
        let checkpoints = CheckpointTracker::new(planner.layout().checkpoints.clone());
        let parked = vec![false; estimators.len()];
        let state = match config.burn_in_ticks {
            0 => LoopState::Estimating,
            remaining => LoopState::Idle { remaining },
        };
        Self {
            state,
            planner,
            estimators,
            parked,
            checkpoints,
            waiting_ticks: 0,
            last_plan: None,
        }
    }

    /// Build planner and `others` estimators from a full configuration.
    pub fn from_config(
        config: &MargaConfig,
        transitions: Arc<TransitionModel>,
        others: usize,
    ) -> Result<Self> {
        config.validate()?;
        let layout: &Layout = &config.layout;
        let planner = RiskPlanner::new(layout, transitions.clone(), config.planner.clone())?;

        let estimators = (0..others)
            .map(|i| {
                let mut estimator_config: EstimatorConfig = config.estimator.clone();
                if estimator_config.seed != 0 {
                    estimator_config.seed = estimator_config.seed.wrapping_add(i as u64);
                }
                Estimator::new(layout, transitions.clone(), estimator_config)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(planner, estimators, config.driver.clone()))
    }

    /// Get current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Estimators for the other agents, in observation order.
    pub fn estimators(&self) -> &[Estimator] {
        &self.estimators
    }

    /// The planner.
    pub fn planner(&self) -> &RiskPlanner {
        &self.planner
    }

    /// Checkpoint progress.
    pub fn checkpoints(&self) -> &CheckpointTracker {
        &self.checkpoints
    }

    /// Consecutive ticks spent holding.
    pub fn waiting_ticks(&self) -> u32 {
        self.waiting_ticks
    }

    /// Plan from the most recent planning stage.
    pub fn last_plan(&self) -> Option<&StepPlan> {
        self.last_plan.as_ref()
    }

    /// Run one tick. Returns `None` during burn-in.
    ///
    /// `observations[i]` feeds the estimator of other agent `i`.
    pub fn tick(
        &mut self,
        position: WorldPoint,
        heading: f32,
        observations: &[RangeObservation],
    ) -> Option<Action> {
        if let LoopState::Idle { remaining } = self.state {
            self.estimate(observations);
            if remaining > 1 {
                self.state = LoopState::Idle {
                    remaining: remaining - 1,
                };
            } else {
                info!(
                    "[Loop] burn-in complete, tracking {} agents",
                    self.estimators.len()
                );
                self.state = LoopState::Estimating;
            }
            return None;
        }

        self.state = LoopState::Estimating;
        self.estimate(observations);

        self.state = LoopState::Planning;
        let layout = self.planner.layout();
        let current = layout.world_to_cell_clamped(position);
        let hold_at = layout.cell_to_world(current);
        self.checkpoints.update(current);
        let plan = self.plan(current, Pose2D::from_position_heading(position, heading));

        self.state = LoopState::Deciding;
        let action = match plan {
            Some(plan) => {
                let advance = self.decide(&plan);
                let action = Action {
                    waypoint: plan.waypoint,
                    advance,
                };
                self.last_plan = Some(plan);
                action
            }
            None => {
                self.waiting_ticks = 0;
                self.last_plan = None;
                Action::hold(hold_at)
            }
        };

        trace!(
            "[Loop] {} -> waypoint ({:.2}, {:.2}) advance={} waiting={}",
            current,
            action.waypoint.x,
            action.waypoint.y,
            action.advance,
            self.waiting_ticks
        );
        self.state = LoopState::Estimating;
        Some(action)
    }

    /// Tick using the body's own position and heading, then steer it.
    pub fn drive<B: AgentBody + ?Sized>(
        &mut self,
        body: &mut B,
        observations: &[RangeObservation],
    ) -> Option<Action> {
        let position = body.current_position();
        let heading = body.current_heading();
        let action = self.tick(position, heading, observations)?;

        let steer = Pose2D::from_position_heading(position, heading).bearing_to(action.waypoint);
        let throttle = if action.advance { 1.0 } else { 0.0 };
        body.apply_action(steer, throttle);
        Some(action)
    }

    fn estimate(&mut self, observations: &[RangeObservation]) {
        if observations.len() != self.estimators.len() {
            warn!(
                "[Loop] got {} observations for {} tracked agents",
                observations.len(),
                self.estimators.len()
            );
        }
        for ((estimator, parked), obs) in self
            .estimators
            .iter_mut()
            .zip(self.parked.iter_mut())
            .zip(observations)
        {
            estimator.update_estimate(obs.observer, obs.range, obs.parked);
            *parked = obs.parked;
        }
    }

    fn plan(&self, current: GridCoord, pose: Pose2D) -> Option<StepPlan> {
        let Some(checkpoint) = self.checkpoints.current() else {
            debug!("[Loop] no checkpoints, holding");
            return None;
        };

        let request = PlanRequest {
            current,
            checkpoint,
            others: self
                .estimators
                .iter()
                .zip(&self.parked)
                .map(|(estimator, &parked)| OtherAgent {
                    belief: estimator.belief(),
                    parked,
                })
                .collect(),
            pose: Some(pose),
        };

        match self.planner.plan_next_step(&request) {
            Ok(plan) => Some(plan),
            Err(e) => {
                warn!("[Loop] {}, holding position", e);
                None
            }
        }
    }

    /// Wait accumulator: hold until the plan allows moving or the wait runs out.
    fn decide(&mut self, plan: &StepPlan) -> bool {
        if plan.advance {
            self.waiting_ticks = 0;
            return true;
        }

        self.waiting_ticks = self.waiting_ticks.saturating_add(1);
        if f64::from(self.waiting_ticks) > plan.max_wait {
            debug!(
                "[Loop] waited {} ticks (max {:.1}), moving anyway",
                self.waiting_ticks, plan.max_wait
            );
            self.waiting_ticks = 0;
            return true;
        }
        false
    }
}
