//! Core types shared by estimation and planning.
//!
//! ## Coordinates
//! - [`GridCoord`]: `(row, col)` cell indices
//! - [`WorldPoint`]: continuous world coordinates; X grows with column,
//!   Y grows with row
//!
//! ## Agent state
//! - [`Pose2D`]: position plus heading, with [`normalize_angle`] helpers
//!
//! ## Sampling
//! - [`WeightedSampler`]: cumulative-weight draws with binary search
//! - [`low_variance_resample`]: systematic resampling

mod point;
mod pose;
mod sampling;

pub use point::{GridCoord, WorldPoint};
pub use pose::{Pose2D, angle_diff, normalize_angle};
pub use sampling::{ResamplingStrategy, WeightedSampler, low_variance_resample};
