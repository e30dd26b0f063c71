//! Error types for Marga.
//!
//! Only construction and loading can fail. Per-tick numeric edge cases are
//! handled by fallback policy, and planning failures are reported through
//! [`PlanError`](crate::planning::PlanError) as hold instructions.

use thiserror::Error;

/// Marga error type
#[derive(Error, Debug)]
pub enum MargaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid transition table: {0}")]
    InvalidTransition(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MargaError>;
