//! Deviation Alert Thresholds
//!
//! A deviation is significant only when it exceeds BOTH the relative
//! threshold (fraction of the expected value) and the absolute threshold
//! (quantity units). The pair keeps small expected values from alerting on
//! noise and large ones from alerting on a fixed absolute gap.

/// Relative threshold for temperature deviations (fraction of expected).
pub const TEMP_ALERT_RELATIVE: f64 = 0.10;

/// Absolute threshold for temperature deviations (°C).
pub const TEMP_ALERT_ABSOLUTE_C: f64 = 10.0;

/// Relative threshold for humidity deviations (fraction of expected).
pub const HUMIDITY_ALERT_RELATIVE: f64 = 0.10;

/// Absolute threshold for humidity deviations (fraction, 0.1 = 10% RH).
pub const HUMIDITY_ALERT_ABSOLUTE_FRACTION: f64 = 0.1;
