//! Shared utilities: easing curves and frame-rate monitoring.

pub mod easing;
pub mod frame_timing;
