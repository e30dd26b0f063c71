//! Default value functions for serde deserialization.

pub fn enabled() -> bool {
    true
}

pub fn particle_factor() -> usize {
    10
}

pub fn sensor_std() -> f64 {
    1.0
}

pub fn cost_factor() -> f64 {
    1000.0
}

pub fn padding_surcharge() -> f64 {
    2.0
}

pub fn checkpoint_discount() -> f64 {
    0.5
}

pub fn high_risk_threshold() -> f64 {
    0.3
}

pub fn parked_wait_rate() -> f64 {
    300.0
}

pub fn moving_wait_rate() -> f64 {
    500.0
}

pub fn turn_wait_floor() -> f64 {
    5.0
}

/// Degrees
pub fn sharp_turn_threshold() -> f32 {
    10.0
}

pub fn clearance_nudge() -> f32 {
    0.25
}

pub fn burn_in_ticks() -> u32 {
    30
}
