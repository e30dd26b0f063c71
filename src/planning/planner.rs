//! Risk-weighted next-step planner.
//!
//! Every call rebuilds the occupancy likelihood from the other agents'
//! beliefs, prices each edge as `base + cost_factor * L(target)`, runs
//! Dijkstra to the current checkpoint, and returns the first step together
//! with a wait budget and a (possibly nudged) world waypoint.

use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults;
use crate::core::{GridCoord, Pose2D, WorldPoint};
use crate::error::{MargaError, Result};
use crate::estimation::{BeliefGrid, TransitionModel};
use crate::layout::Layout;

use super::dijkstra::dijkstra;
use super::graph::{UNIT_COST, WorldGraph};
use super::occupancy::{OccupancyMap, SpreadKernel};

/// Planner tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Scale from occupancy likelihood to edge cost.
    #[serde(default = "defaults::cost_factor")]
    pub cost_factor: f64,
    /// Extra base cost for entering a padded cell. Must be below `cost_factor`.
    #[serde(default = "defaults::padding_surcharge")]
    pub padding_surcharge: f64,
    /// Fraction of the risk charged on edges into the checkpoint, in (0, 1).
    #[serde(default = "defaults::checkpoint_discount")]
    pub checkpoint_discount: f64,
    /// Likelihood above which an unparked next cell means "wait indefinitely".
    #[serde(default = "defaults::high_risk_threshold")]
    pub high_risk_threshold: f64,
    /// Wait ticks per unit likelihood next to a parked agent.
    #[serde(default = "defaults::parked_wait_rate")]
    pub parked_wait_rate: f64,
    /// Wait ticks per unit likelihood elsewhere.
    #[serde(default = "defaults::moving_wait_rate")]
    pub moving_wait_rate: f64,
    /// Minimum wait before a sharp turn near a checkpoint or padding.
    #[serde(default = "defaults::turn_wait_floor")]
    pub turn_wait_floor: f64,
    /// Heading error (degrees) above which a turn counts as sharp.
    #[serde(default = "defaults::sharp_turn_threshold")]
    pub sharp_turn_threshold: f32,
    /// Waypoint offset (world units) away from an adjacent obstacle on sharp turns.
    #[serde(default = "defaults::clearance_nudge")]
    pub clearance_nudge: f32,
    /// Spread applied to parked agents' beliefs.
    #[serde(default = "SpreadKernel::parked")]
    pub parked_kernel: SpreadKernel,
    /// Spread applied to moving agents' predicted beliefs.
    #[serde(default = "SpreadKernel::moving")]
    pub moving_kernel: SpreadKernel,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cost_factor: defaults::cost_factor(),
            padding_surcharge: defaults::padding_surcharge(),
            checkpoint_discount: defaults::checkpoint_discount(),
            high_risk_threshold: defaults::high_risk_threshold(),
            parked_wait_rate: defaults::parked_wait_rate(),
            moving_wait_rate: defaults::moving_wait_rate(),
            turn_wait_floor: defaults::turn_wait_floor(),
            sharp_turn_threshold: defaults::sharp_turn_threshold(),
            clearance_nudge: defaults::clearance_nudge(),
            parked_kernel: SpreadKernel::parked(),
            moving_kernel: SpreadKernel::moving(),
        }
    }
}

impl PlannerConfig {
    /// Reject settings that break the cost model.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MargaError::InvalidConfig(msg));

        if !(self.cost_factor.is_finite() && self.cost_factor > 0.0) {
            return invalid(format!(
                "planner.cost_factor must be positive, got {}",
                self.cost_factor
            ));
        }
        if !(self.padding_surcharge > 0.0 && self.padding_surcharge < self.cost_factor) {
            return invalid(format!(
                "planner.padding_surcharge must lie in (0, {}), got {}",
                self.cost_factor, self.padding_surcharge
            ));
        }
        if !(self.checkpoint_discount > 0.0 && self.checkpoint_discount < 1.0) {
            return invalid(format!(
                "planner.checkpoint_discount must lie in (0, 1), got {}",
                self.checkpoint_discount
            ));
        }
        let rates = [
            ("high_risk_threshold", self.high_risk_threshold),
            ("parked_wait_rate", self.parked_wait_rate),
            ("moving_wait_rate", self.moving_wait_rate),
            ("turn_wait_floor", self.turn_wait_floor),
        ];
        for (name, value) in rates {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("planner.{} must be non-negative, got {}", name, value));
            }
        }
        if !(self.sharp_turn_threshold.is_finite() && self.sharp_turn_threshold >= 0.0) {
            return invalid(format!(
                "planner.sharp_turn_threshold must be non-negative, got {}",
                self.sharp_turn_threshold
            ));
        }
        if !self.clearance_nudge.is_finite() {
            return invalid("planner.clearance_nudge must be finite".to_string());
        }
        if !self.parked_kernel.is_valid() || !self.moving_kernel.is_valid() {
            return invalid("planner spread kernels need non-negative weights".to_string());
        }
        Ok(())
    }
}

/// Why no step could be planned. The caller holds position.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("no path from {start} to {goal}")]
    UnreachableGoal { start: GridCoord, goal: GridCoord },

    #[error("cell {cell} is not on the world graph")]
    OffGraph { cell: GridCoord },
}

/// Another agent as seen by the planner.
#[derive(Clone, Copy, Debug)]
pub struct OtherAgent<'a> {
    pub belief: &'a BeliefGrid,
    pub parked: bool,
}

/// Inputs for one planning call.
#[derive(Clone, Debug)]
pub struct PlanRequest<'a> {
    /// Cell the agent occupies.
    pub current: GridCoord,
    /// Cell the agent is heading to.
    pub checkpoint: GridCoord,
    /// Beliefs about every other agent.
    pub others: Vec<OtherAgent<'a>>,
    /// Agent pose, for the sharp-turn rules. `None` disables them.
    pub pose: Option<Pose2D>,
}

/// Outcome of one planning call.
#[derive(Clone, Debug, PartialEq)]
pub struct StepPlan {
    /// First cell after `current` on the path (`current` itself if already
    /// there, in which case the plan never advances).
    pub next: GridCoord,
    /// World target for the steering collaborator.
    pub waypoint: WorldPoint,
    /// Full path from `current` to the checkpoint.
    pub path: Vec<GridCoord>,
    /// Total path cost under this tick's risk.
    pub cost: f64,
    /// Occupancy likelihood of `next`.
    pub risk: f64,
    /// Ticks to wait before moving anyway. May be infinite.
    pub max_wait: f64,
    /// True when there is no reason to wait.
    pub advance: bool,
}

/// Per-tick edge pricing over the static graph.
struct RiskOverlay<'a> {
    likelihood: &'a OccupancyMap,
    graph: &'a WorldGraph,
    goal: usize,
    cost_factor: f64,
    checkpoint_discount: f64,
}

impl RiskOverlay<'_> {
    fn edge_cost(&self, to: usize, base: f64) -> f64 {
        let risk = self.likelihood.get(self.graph.coord(to));
        if to == self.goal {
            UNIT_COST + self.checkpoint_discount * self.cost_factor * risk
        } else {
            base + self.cost_factor * risk
        }
    }
}

/// Shortest-path planner priced by other agents' occupancy.
#[derive(Clone, Debug)]
pub struct RiskPlanner {
    layout: Layout,
    graph: Arc<WorldGraph>,
    transitions: Arc<TransitionModel>,
    config: PlannerConfig,
}

impl RiskPlanner {
    /// Build the world graph for `layout` and create a planner over it.
    pub fn new(
        layout: &Layout,
        transitions: Arc<TransitionModel>,
        config: PlannerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let graph = Arc::new(WorldGraph::build(layout, config.padding_surcharge)?);
        Self::with_graph(layout, graph, transitions, config)
    }

    /// Create a planner over an existing shared graph.
    pub fn with_graph(
        layout: &Layout,
        graph: Arc<WorldGraph>,
        transitions: Arc<TransitionModel>,
        config: PlannerConfig,
    ) -> Result<Self> {
        config.validate()?;
        if (graph.rows(), graph.cols()) != (layout.rows, layout.cols)
            || (transitions.rows(), transitions.cols()) != (layout.rows, layout.cols)
        {
            return Err(MargaError::InvalidLayout(format!(
                "layout is {}x{} but graph is {}x{} and transition table is {}x{}",
                layout.rows,
                layout.cols,
                graph.rows(),
                graph.cols(),
                transitions.rows(),
                transitions.cols()
            )));
        }
        Ok(Self {
            layout: layout.clone(),
            graph,
            transitions,
            config,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The shared world graph.
    pub fn graph(&self) -> &Arc<WorldGraph> {
        &self.graph
    }

    /// The layout this planner was built for.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Occupancy likelihood for the given agents.
    ///
    /// Moving agents are advanced one step through the transition model first.
    /// The input beliefs are not modified.
    pub fn occupancy(&self, others: &[OtherAgent<'_>]) -> OccupancyMap {
        let mut map = OccupancyMap::new(self.layout.rows, self.layout.cols);
        for other in others {
            if other.parked {
                map.accumulate(other.belief, &self.config.parked_kernel);
            } else {
                let predicted = self.transitions.predict(other.belief);
                map.accumulate(&predicted, &self.config.moving_kernel);
            }
        }
        map.normalize();
        map
    }

    /// Plan the next step toward `request.checkpoint`.
    pub fn plan_next_step(&self, request: &PlanRequest<'_>) -> std::result::Result<StepPlan, PlanError> {
        let start = request.current;
        let goal = request.checkpoint;
        for cell in [start, goal] {
            if !self.graph.is_node(cell) {
                return Err(PlanError::OffGraph { cell });
            }
        }
        let (Some(start_idx), Some(goal_idx)) = (self.graph.index(start), self.graph.index(goal))
        else {
            return Err(PlanError::OffGraph { cell: start });
        };

        let likelihood = self.occupancy(&request.others);
        let parked_locations: Vec<GridCoord> = request
            .others
            .iter()
            .filter(|o| o.parked)
            .map(|o| o.belief.argmax())
            .collect();
        trace!(
            "[Planner] {} agents ({} parked), overlay mass {:.3}",
            request.others.len(),
            parked_locations.len(),
            likelihood.total()
        );

        let overlay = RiskOverlay {
            likelihood: &likelihood,
            graph: &self.graph,
            goal: goal_idx,
            cost_factor: self.config.cost_factor,
            checkpoint_discount: self.config.checkpoint_discount,
        };
        let result = dijkstra(self.graph.adjacency(), start_idx, goal_idx, |_, to, base| {
            overlay.edge_cost(to, base)
        })
        .ok_or(PlanError::UnreachableGoal { start, goal })?;

        let path: Vec<GridCoord> = result.path.iter().map(|&i| self.graph.coord(i)).collect();
        let next = path.get(1).copied().unwrap_or(start);
        let risk = likelihood.get(next);

        let sharp_turn = request
            .pose
            .is_some_and(|pose| self.is_sharp_turn(pose, self.layout.cell_to_world(next)));
        // Already on the checkpoint: hold here until it changes
        let max_wait = if next == start {
            f64::INFINITY
        } else {
            self.max_wait(start, next, risk, &parked_locations, sharp_turn)
        };
        let waypoint = self.waypoint(next, sharp_turn);

        debug!(
            "[Planner] {} -> {}: next={} cost={:.2} risk={:.4} max_wait={}",
            start, goal, next, result.cost, risk, max_wait
        );

        Ok(StepPlan {
            next,
            waypoint,
            path,
            cost: result.cost,
            risk,
            max_wait,
            advance: max_wait == 0.0,
        })
    }

    fn is_sharp_turn(&self, pose: Pose2D, target: WorldPoint) -> bool {
        pose.bearing_to(target).abs().to_degrees() > self.config.sharp_turn_threshold
    }

    fn is_checkpoint(&self, cell: GridCoord) -> bool {
        self.layout.checkpoints.contains(&cell)
    }

    fn max_wait(
        &self,
        start: GridCoord,
        next: GridCoord,
        risk: f64,
        parked_locations: &[GridCoord],
        sharp_turn: bool,
    ) -> f64 {
        let near_parked = parked_locations
            .iter()
            .any(|p| p.chebyshev_distance(&next) <= 1);

        let mut wait = if near_parked {
            self.config.parked_wait_rate * risk
        } else if risk > self.config.high_risk_threshold {
            f64::INFINITY
        } else {
            self.config.moving_wait_rate * risk
        };

        let delicate = |cell: GridCoord| self.is_checkpoint(cell) || self.graph.is_padded(cell);
        if sharp_turn && (delicate(start) || delicate(next)) {
            wait = wait.max(self.config.turn_wait_floor);
        }
        wait
    }

    /// Cell center, pushed away from adjacent obstacles before a sharp turn
    /// into a padded cell.
    fn waypoint(&self, next: GridCoord, sharp_turn: bool) -> WorldPoint {
        let center = self.layout.cell_to_world(next);
        if !(sharp_turn && self.graph.is_padded(next)) {
            return center;
        }

        let nudge = self.config.clearance_nudge;
        let mut offset = WorldPoint::ZERO;
        for block in self.graph.contours(next) {
            if block.row == next.row {
                offset.x += (next.col - block.col) as f32 * nudge;
            } else if block.col == next.col {
                offset.y += (next.row - block.row) as f32 * nudge;
            }
        }
        center + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BlockRect;
    use approx::assert_relative_eq;

    fn open_planner(rows: usize, cols: usize) -> RiskPlanner {
        let layout = Layout::new(rows, cols);
        let model = Arc::new(TransitionModel::stationary(rows, cols).unwrap());
        RiskPlanner::new(&layout, model, PlannerConfig::default()).unwrap()
    }

    fn request(current: GridCoord, checkpoint: GridCoord) -> PlanRequest<'static> {
        PlanRequest {
            current,
            checkpoint,
            others: Vec::new(),
            pose: None,
        }
    }

    #[test]
    fn test_no_agents_free_path() {
        let planner = open_planner(3, 3);
        let plan = planner
            .plan_next_step(&request(GridCoord::new(1, 0), GridCoord::new(1, 2)))
            .unwrap();
        assert_eq!(plan.next, GridCoord::new(1, 1));
        assert_eq!(plan.path.len(), 3);
        assert_eq!(plan.max_wait, 0.0);
        assert!(plan.advance);
        assert_eq!(plan.waypoint, WorldPoint::new(1.5, 1.5));
    }

    #[test]
    fn test_already_at_checkpoint() {
        let planner = open_planner(3, 3);
        let here = GridCoord::new(1, 1);
        let plan = planner.plan_next_step(&request(here, here)).unwrap();
        assert_eq!(plan.next, here);
        assert_eq!(plan.path, vec![here]);
        assert_eq!(plan.cost, 0.0);
        assert_eq!(plan.waypoint, WorldPoint::new(1.5, 1.5));
        assert!(!plan.advance);
        assert!(plan.max_wait.is_infinite());
    }

    #[test]
    fn test_off_graph_and_unreachable() {
        let layout = Layout::new(5, 5).with_block(BlockRect::new(0, 2, 5, 3));
        let model = Arc::new(TransitionModel::stationary(5, 5).unwrap());
        let planner = RiskPlanner::new(&layout, model, PlannerConfig::default()).unwrap();

        let blocked = GridCoord::new(2, 2);
        assert_eq!(
            planner.plan_next_step(&request(blocked, GridCoord::new(0, 0))),
            Err(PlanError::OffGraph { cell: blocked })
        );
        assert_eq!(
            planner.plan_next_step(&request(GridCoord::new(0, 0), GridCoord::new(0, 9))),
            Err(PlanError::OffGraph {
                cell: GridCoord::new(0, 9)
            })
        );

        let (start, goal) = (GridCoord::new(0, 0), GridCoord::new(4, 4));
        assert_eq!(
            planner.plan_next_step(&request(start, goal)),
            Err(PlanError::UnreachableGoal { start, goal })
        );
    }

    #[test]
    fn test_high_risk_waits_forever() {
        let planner = open_planner(1, 3);
        let belief = BeliefGrid::point_mass(1, 3, GridCoord::new(0, 1));
        let mut req = request(GridCoord::new(0, 0), GridCoord::new(0, 2));
        req.others.push(OtherAgent {
            belief: &belief,
            parked: false,
        });

        let plan = planner.plan_next_step(&req).unwrap();
        assert_eq!(plan.next, GridCoord::new(0, 1));
        assert!(plan.risk > 0.3);
        assert!(plan.max_wait.is_infinite());
        assert!(!plan.advance);
    }

    #[test]
    fn test_parked_neighbor_uses_parked_rate() {
        let planner = open_planner(1, 3);
        let belief = BeliefGrid::point_mass(1, 3, GridCoord::new(0, 1));
        let mut req = request(GridCoord::new(0, 0), GridCoord::new(0, 2));
        req.others.push(OtherAgent {
            belief: &belief,
            parked: true,
        });

        let plan = planner.plan_next_step(&req).unwrap();
        assert!(plan.max_wait.is_finite());
        assert_relative_eq!(plan.max_wait, 300.0 * plan.risk);
        assert!(!plan.advance);
    }

    #[test]
    fn test_risk_detour() {
        let planner = open_planner(3, 3);
        let belief = BeliefGrid::point_mass(3, 3, GridCoord::new(1, 1));
        let mut req = request(GridCoord::new(1, 0), GridCoord::new(1, 2));
        req.others.push(OtherAgent {
            belief: &belief,
            parked: false,
        });

        let plan = planner.plan_next_step(&req).unwrap();
        assert!(!plan.path.contains(&GridCoord::new(1, 1)));
        assert_eq!(plan.path.len(), 5);
    }

    #[test]
    fn test_occupancy_leaves_beliefs_untouched() {
        let rows = 4;
        let layout = Layout::new(rows, rows);
        let model = Arc::new(TransitionModel::uniform_neighbors(rows, rows).unwrap());
        let planner = RiskPlanner::new(&layout, model, PlannerConfig::default()).unwrap();

        let belief = BeliefGrid::point_mass(rows, rows, GridCoord::new(1, 1));
        let snapshot = belief.clone();
        let map = planner.occupancy(&[OtherAgent {
            belief: &belief,
            parked: false,
        }]);

        assert_eq!(belief, snapshot);
        assert_relative_eq!(map.total(), 1.0, epsilon = 1e-12);
        // Prediction spreads mass two cells out once the kernel is applied
        assert!(map.get(GridCoord::new(3, 3)) > 0.0);
    }

    #[test]
    fn test_sharp_turn_floor_and_nudge() {
        let layout = Layout::new(5, 5).with_block(BlockRect::new(2, 2, 3, 3));
        let model = Arc::new(TransitionModel::stationary(5, 5).unwrap());
        let planner = RiskPlanner::new(&layout, model, PlannerConfig::default()).unwrap();

        // At (1, 1) facing +X (toward col 2); the goal lies straight down
        let start = GridCoord::new(1, 1);
        let mut req = request(start, GridCoord::new(3, 1));
        req.pose = Some(Pose2D::from_position_heading(layout.cell_to_world(start), 0.0));

        let plan = planner.plan_next_step(&req).unwrap();
        assert_eq!(plan.next, GridCoord::new(2, 1));
        assert_eq!(plan.max_wait, 5.0);
        assert!(!plan.advance);

        // (2, 1) has the obstacle at (2, 2) on its right: pushed toward -X
        let center = layout.cell_to_world(plan.next);
        assert_relative_eq!(plan.waypoint.x, center.x - 0.25);
        assert_relative_eq!(plan.waypoint.y, center.y);
    }

    #[test]
    fn test_config_validation() {
        assert!(PlannerConfig::default().validate().is_ok());

        let bad = PlannerConfig {
            padding_surcharge: 2000.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = PlannerConfig {
            checkpoint_discount: 1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
