//! Constants for ThermoGuard Core
//!
//! Centralised numeric defaults used throughout the simulation. Every value
//! that a station configuration can override has its default here, next to
//! the unit it is expressed in.
//!
//! ## Organization
//!
//! - **Sensors**: noise magnitudes and operator offset steps per quantity
//! - **Alerts**: deviation thresholds per quantity
//! - **Time**: day length and driver intervals
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Name constants with their unit as suffix
//! 3. Humidity is expressed as a fraction of saturation (0.0..=1.0)

/// Probe noise and offset step specifications.
pub mod sensors;

/// Alert thresholds for deviation detection.
pub mod alerts;

/// Time-related constants for profiles and drivers.
pub mod time;

pub use sensors::{
    TEMP_NOISE_C, TEMP_OFFSET_STEP_C,
    HUMIDITY_NOISE_FRACTION, HUMIDITY_OFFSET_STEP_FRACTION,
};

pub use alerts::{
    TEMP_ALERT_RELATIVE, TEMP_ALERT_ABSOLUTE_C,
    HUMIDITY_ALERT_RELATIVE, HUMIDITY_ALERT_ABSOLUTE_FRACTION,
};

pub use time::{
    SECONDS_PER_DAY, DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_AVERAGE_INTERVAL_MS,
};
