//! Agent pose and angle helpers.

use std::f32::consts::{PI, TAU};

use super::point::WorldPoint;

/// Normalize angle to [-π, π).
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a >= PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

/// Signed shortest angular difference from `from` to `to`.
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Position and heading of an agent in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose2D {
    /// X position
    pub x: f32,
    /// Y position
    pub y: f32,
    /// Heading in radians [-π, π), CCW positive from +X.
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose (heading is normalized).
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Create a pose from position and heading.
    #[inline]
    pub fn from_position_heading(position: WorldPoint, theta: f32) -> Self {
        Self::new(position.x, position.y, theta)
    }

    /// Position component.
    #[inline]
    pub fn position(self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Signed heading error toward `target`: how far the agent must turn to face it.
    ///
    /// Zero when the target coincides with the agent position.
    #[inline]
    pub fn bearing_to(self, target: WorldPoint) -> f32 {
        let position = self.position();
        if position.distance_squared(&target) < f32::EPSILON {
            return 0.0;
        }
        angle_diff(self.theta, position.angle_to(&target))
    }
}
