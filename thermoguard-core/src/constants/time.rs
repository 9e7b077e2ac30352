//! Time-Related Constants
//!
//! Day length used by profile anchoring, and default intervals for the two
//! periodic drivers.

// ===== TIME UNIT CONVERSIONS =====

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u32 = 60 * SECONDS_PER_MINUTE;

/// Seconds per day. Profiles are cyclic over this period.
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

// ===== DRIVER INTERVALS =====

/// Default sampling tick (milliseconds).
///
/// 10 Hz: fast enough that an interval average smooths the probe noise.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 100;

/// Default averaging tick (milliseconds).
///
/// Twenty samples per average at the default sampling rate.
pub const DEFAULT_AVERAGE_INTERVAL_MS: u64 = 2000;
