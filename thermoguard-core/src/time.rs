//! Time management for the simulation
//!
//! Provides a clock abstraction so the pipeline can run against:
//! - The local wall clock (normal operation)
//! - A fixed, manually advanced clock (tests, deterministic replays)
//!
//! Profiles only look at the time-of-day part of a timestamp; readings keep
//! the full local date-time so persisted rows can be ordered.

use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime, Timelike};

use crate::constants::SECONDS_PER_DAY;

/// Local wall-clock instant carried by readings and alerts
pub type Timestamp = NaiveDateTime;

/// Source of time for the station
pub trait Clock: Send + Sync {
    /// Current local date-time
    fn now(&self) -> Timestamp;
}

/// Local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().naive_local()
    }
}

/// Fixed time source for testing
#[derive(Debug)]
pub struct FixedClock {
    timestamp: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Mutex::new(timestamp),
        }
    }

    pub fn set(&self, timestamp: Timestamp) {
        *self.lock() = timestamp;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.lock();
        *guard += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
        self.timestamp.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.lock()
    }
}

/// Seconds since midnight, including the sub-second part
pub fn seconds_of_day(time: NaiveTime) -> f64 {
    // Leap-second representation (nanos >= 1e9) is folded into the last second
    let nanos = time.nanosecond().min(999_999_999);
    f64::from(time.num_seconds_from_midnight()) + f64::from(nanos) / 1e9
}

/// Forward distance from `from` to `to` around the 24h cycle, in `[0, day)`
pub fn cyclic_distance(from: f64, to: f64) -> f64 {
    (to - from).rem_euclid(f64::from(SECONDS_PER_DAY))
}
