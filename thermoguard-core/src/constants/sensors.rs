//! Simulated Probe Specifications
//!
//! Noise magnitudes and operator offset steps for each simulated quantity.
//! A probe draws its error uniformly from `[-noise, +noise]` and moves its
//! drift offset by one step per operator command.

// ===== TEMPERATURE PROBE =====

/// Half-width of the uniform reading error for temperature probes (°C).
///
/// Matches the ±0.5°C accuracy of consumer-grade sensors (DS18B20, SHT31).
pub const TEMP_NOISE_C: f64 = 0.5;

/// Offset change applied by one raise/mitigate command (°C).
pub const TEMP_OFFSET_STEP_C: f64 = 0.5;

// ===== HUMIDITY PROBE =====

/// Half-width of the uniform reading error for humidity probes (fraction).
///
/// 0.05 = ±5% RH, the accuracy class of budget sensors (DHT11, HIH4000).
pub const HUMIDITY_NOISE_FRACTION: f64 = 0.05;

/// Offset change applied by one raise/mitigate command (fraction).
///
/// 0.04 = 4% RH per step.
pub const HUMIDITY_OFFSET_STEP_FRACTION: f64 = 0.04;
