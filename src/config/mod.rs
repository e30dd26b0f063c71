//! Unified configuration loading for Marga.
//!
//! Loads all configuration from a single YAML file. Every section and field
//! is optional and falls back to the values in [`defaults`].
//!
//! ## Configuration Sections
//!
//! | Section | Type | Description |
//! |---------|------|-------------|
//! | `layout` | [`Layout`](crate::layout::Layout) | Grid size, tile size, obstacles, checkpoints |
//! | `estimator` | [`EstimatorConfig`](crate::estimation::EstimatorConfig) | Particle count, sensor noise, resampling |
//! | `planner` | [`PlannerConfig`](crate::planning::PlannerConfig) | Risk scale, surcharges, wait rates, kernels |
//! | `driver` | [`DriverConfig`](crate::driver::DriverConfig) | Burn-in length |
//!
//! ## Example YAML
//!
//! ```yaml
//! layout:
//!   rows: 10
//!   cols: 10
//!   blocks:
//!     - { row_min: 2, col_min: 2, row_max: 4, col_max: 4 }
//!   checkpoints:
//!     - { row: 9, col: 9 }
//! estimator:
//!   sensor_std: 0.5
//!   resampling: low_variance
//! planner:
//!   cost_factor: 1000.0
//! ```

pub mod defaults;
mod marga;

pub use marga::{DEFAULT_CONFIG_PATH, MargaConfig};
