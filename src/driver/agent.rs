//! Narrow interfaces between the planning loop and the outside world.

use crate::core::WorldPoint;

/// The controlled agent's body.
///
/// Implemented by whatever moves the agent: a simulator car, a test double,
/// or real hardware.
pub trait AgentBody {
    /// World position of the agent.
    fn current_position(&self) -> WorldPoint;

    /// Heading in radians, CCW positive from +X.
    fn current_heading(&self) -> f32;

    /// Steer by `steer` radians (signed heading error to the waypoint) with
    /// `throttle` in `[0, 1]`.
    fn apply_action(&mut self, steer: f32, throttle: f32);
}

/// What the loop decided this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Action {
    /// World position to steer toward.
    pub waypoint: WorldPoint,
    /// Drive forward (true) or hold (false).
    pub advance: bool,
}

impl Action {
    /// Stay put, pointing at `waypoint`.
    pub fn hold(waypoint: WorldPoint) -> Self {
        Self {
            waypoint,
            advance: false,
        }
    }
}

/// One range reading of another agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeObservation {
    /// Where the observer was when measuring.
    pub observer: WorldPoint,
    /// Noisy distance to the other agent.
    pub range: f32,
    /// The other agent never moves.
    pub parked: bool,
}

impl RangeObservation {
    pub fn new(observer: WorldPoint, range: f32, parked: bool) -> Self {
        Self {
            observer,
            range,
            parked,
        }
    }
}
