//! Time-of-Day Profiles with Cyclic Linear Interpolation
//!
//! ## Overview
//!
//! A profile is the target a simulated probe tracks over a day. It is made of
//! milestones, each pinning a value to a time-of-day. Between two milestones
//! the expected value moves linearly; after the last milestone it moves
//! towards the first one of the next day.
//!
//! ```text
//!  value
//!   20 ┤            ●─────────╮            milestones: 06:00 → 10.0
//!      │          ╱            ╲                       18:00 → 20.0
//!   10 ┤────────●                ╲──────── (wraps from 18:00 to 06:00)
//!      └────┬───────────┬───────────┬────
//!         06:00       18:00       06:00+1
//! ```
//!
//! ## Anchoring
//!
//! Milestones are anchored one of two ways:
//! - **Evenly spaced**: `n` values, milestone `i` at `i * 24h / n`
//!   (see [`Profile::evenly_spaced`]).
//! - **Explicit**: each milestone carries its own time-of-day
//!   (see [`Profile::new`]).
//!
//! Both produce the same sorted `(time, value)` sequence; interpolation does
//! not know which form was used.
//!
//! ## Interpolation
//!
//! For a query time `t`, the bracketing pair is the last milestone at or
//! before `t` (wrapping to the last milestone of the day when `t` precedes
//! the first) and its successor:
//!
//! ```text
//! elapsed   = (t - anchor(current)) mod 24h
//! remaining = (anchor(next) - t)    mod 24h   (a full cycle if 0)
//! value     = current + (next - current) * elapsed / (elapsed + remaining)
//! ```
//!
//! Anchors are validated to be distinct at construction, so the span is
//! always positive and queries cannot fail. Negative values are legitimate
//! (freezing temperatures) and are never rejected.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{
    constants::SECONDS_PER_DAY,
    errors::{MonitorError, MonitorResult},
    time::{cyclic_distance, seconds_of_day},
};

/// Target value pinned to a time-of-day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Wall-clock time-of-day the value applies to
    pub time: NaiveTime,
    /// Target value at that time
    pub value: f64,
}

impl Milestone {
    pub fn new(time: NaiveTime, value: f64) -> Self {
        Self { time, value }
    }

    fn anchor(&self) -> f64 {
        seconds_of_day(self.time)
    }
}

/// Ordered set of milestones for one quantity
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    milestones: Vec<Milestone>,
}

impl Profile {
    /// Build a profile from explicitly time-stamped milestones
    ///
    /// Milestones may be given in any order; they are sorted by time-of-day.
    /// Fails on an empty set, a non-finite value, or two milestones sharing
    /// the same time-of-day (which would make an interpolation span zero).
    pub fn new(mut milestones: Vec<Milestone>) -> MonitorResult<Self> {
        if milestones.is_empty() {
            return Err(MonitorError::invalid_profile("at least one milestone is required"));
        }
        if let Some(bad) = milestones.iter().find(|m| !m.value.is_finite()) {
            return Err(MonitorError::invalid_profile(format!(
                "milestone at {} has a non-finite value",
                bad.time
            )));
        }

        milestones.sort_by(|a, b| a.time.cmp(&b.time));
        if let Some(pair) = milestones.windows(2).find(|w| w[0].time == w[1].time) {
            return Err(MonitorError::invalid_profile(format!(
                "two milestones anchored at {}",
                pair[0].time
            )));
        }

        Ok(Self { milestones })
    }

    /// Build a profile from values spread evenly over the day
    ///
    /// With `n` values, value `i` is anchored at `i * 24h / n` (truncated to
    /// whole seconds), starting at midnight.
    pub fn evenly_spaced(values: Vec<f64>) -> MonitorResult<Self> {
        let count = values.len() as u64;
        if count > u64::from(SECONDS_PER_DAY) {
            return Err(MonitorError::invalid_profile(
                "more milestones than seconds in a day",
            ));
        }

        let milestones = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let secs = index as u64 * u64::from(SECONDS_PER_DAY) / count;
                u32::try_from(secs)
                    .ok()
                    .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0))
                    .map(|time| Milestone::new(time, value))
                    .ok_or_else(|| {
                        MonitorError::invalid_profile(format!(
                            "milestone {index} cannot be anchored at {secs}s"
                        ))
                    })
            })
            .collect::<MonitorResult<Vec<_>>>()?;

        Self::new(milestones)
    }

    /// Profile with a single, constant value
    pub fn constant(value: f64) -> MonitorResult<Self> {
        Self::new(vec![Milestone::new(NaiveTime::MIN, value)])
    }

    /// Milestones sorted by time-of-day
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Smallest milestone value
    pub fn min_value(&self) -> f64 {
        self.milestones.iter().map(|m| m.value).fold(f64::INFINITY, f64::min)
    }

    /// Largest milestone value
    pub fn max_value(&self) -> f64 {
        self.milestones.iter().map(|m| m.value).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Expected value at the given time-of-day
    pub fn expected_value(&self, time: NaiveTime) -> f64 {
        let (current, next) = match self.bracket(time) {
            Some(pair) => pair,
            None => return self.milestones[0].value,
        };

        let now = seconds_of_day(time);
        let elapsed = cyclic_distance(current.anchor(), now);
        let mut remaining = cyclic_distance(now, next.anchor());
        if remaining == 0.0 {
            remaining = f64::from(SECONDS_PER_DAY);
        }

        let span = elapsed + remaining;
        let fraction = elapsed / span;
        current.value + (next.value - current.value) * fraction
    }

    /// Locate `(current, next)` around `time`; `None` for a single milestone
    fn bracket(&self, time: NaiveTime) -> Option<(&Milestone, &Milestone)> {
        let count = self.milestones.len();
        if count == 1 {
            return None;
        }

        // Index of the first milestone strictly after `time`
        let after = self.milestones.partition_point(|m| m.time <= time);
        let current = if after == 0 { count - 1 } else { after - 1 };
        let next = (current + 1) % count;
        Some((&self.milestones[current], &self.milestones[next]))
    }
}
