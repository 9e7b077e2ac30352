//! Hysteretic Deviation Alerts
//!
//! ## State Machine
//!
//! One evaluator runs per monitored channel and is fed once per averaging
//! cycle with `(actual, expected)`:
//!
//! ```text
//!                 significant, kind K
//!   ┌────────┐ ─────────────────────────▶ ┌──────────────┐
//!   │ Normal │                            │ Alerting(K)  │──┐ significant, kind K'≠K
//!   └────────┘ ◀───────────────────────── └──────────────┘◀─┘ (fires again)
//!                 not significant
//!                 (silent clear)
//! ```
//!
//! Alerts are edge-triggered: an event is produced only when entering the
//! alerting state or switching kind. A deviation that persists unchanged
//! across cycles stays silent, and returning to normal produces no event.
//!
//! ## Significance
//!
//! A deviation is significant when it exceeds both thresholds:
//!
//! ```text
//! difference = |actual - expected|
//! significant = difference > |expected| * relative  AND  difference > absolute
//! ```
//!
//! The relative bound uses the magnitude of the expected value so that
//! below-zero temperature targets are judged like their positive mirror.

use serde::{Deserialize, Serialize};

use crate::errors::{MonitorError, MonitorResult};

/// Threshold pair deciding when a deviation matters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Fraction of the expected value (0.10 = 10%)
    pub relative: f64,
    /// Deviation in quantity units
    pub absolute: f64,
}

impl AlertThresholds {
    pub fn validate(&self) -> MonitorResult<()> {
        if !self.relative.is_finite() || self.relative < 0.0 {
            return Err(MonitorError::InvalidSettings {
                reason: "relative threshold must be finite and non-negative",
            });
        }
        if !self.absolute.is_finite() || self.absolute < 0.0 {
            return Err(MonitorError::InvalidSettings {
                reason: "absolute threshold must be finite and non-negative",
            });
        }
        Ok(())
    }

    /// True when `difference` exceeds both bounds for this `expected`
    pub fn is_significant(&self, difference: f64, expected: f64) -> bool {
        difference > expected.abs() * self.relative && difference > self.absolute
    }
}

/// Direction of a deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TooHigh,
    TooLow,
}

impl AlertKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertKind::TooHigh => "too_high",
            AlertKind::TooLow => "too_low",
        }
    }
}

/// Evaluator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Normal,
    Alerting(AlertKind),
}

impl AlertState {
    pub fn is_active(&self) -> bool {
        matches!(self, AlertState::Alerting(_))
    }

    pub fn kind(&self) -> Option<AlertKind> {
        match self {
            AlertState::Normal => None,
            AlertState::Alerting(kind) => Some(*kind),
        }
    }
}

/// Alert produced on a transition into (or between kinds of) alerting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub kind: AlertKind,
    pub expected: f64,
    pub actual: f64,
    /// Absolute gap between actual and expected
    pub difference: f64,
}

/// Edge-triggered alert state machine for one channel
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
    state: AlertState,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self {
            thresholds,
            state: AlertState::Normal,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds
    }

    /// Feed one averaged value; returns the deviation when an alert fires
    pub fn evaluate(&mut self, actual: f64, expected: f64) -> Option<Deviation> {
        let difference = (actual - expected).abs();

        if !self.thresholds.is_significant(difference, expected) {
            if let AlertState::Alerting(kind) = self.state {
                log::debug!("{} deviation cleared (difference {:.3})", kind.as_str(), difference);
                self.state = AlertState::Normal;
            }
            return None;
        }

        let kind = if actual > expected {
            AlertKind::TooHigh
        } else {
            AlertKind::TooLow
        };

        if self.state == AlertState::Alerting(kind) {
            return None;
        }

        self.state = AlertState::Alerting(kind);
        Some(Deviation {
            kind,
            expected,
            actual,
            difference,
        })
    }
}
