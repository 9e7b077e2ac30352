//! Event Types Flowing from the Pipeline to Its Sinks
//!
//! ## Overview
//!
//! The simulation core never formats or stores anything itself. Everything
//! it produces leaves as one of three typed events:
//!
//! 1. **Sample**: one raw probe reading, every sampling tick
//! 2. **Average**: the mean of an aggregation window, every averaging tick
//!    that had at least one reading
//! 3. **Alert**: a deviation edge decided by the alert evaluator
//!
//! ```text
//! Probe ──▶ Aggregator ──▶ AlertEvaluator
//!   │           │                │
//! Sample     Average           Alert
//!   └───────────┴────────┬───────┘
//!                   Dispatcher ──▶ console, storage, ...
//! ```
//!
//! Events carry typed numbers and timestamps. Units, decimal places and
//! labels are the sink's business.

use serde::{Deserialize, Serialize};

use crate::{
    alert::{AlertKind, Deviation},
    quantity::Quantity,
    time::Timestamp,
};

/// One value produced by a probe, or the mean of a window of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Source identifier (e.g., "lab/temperature")
    pub source_id: String,
    /// What was measured
    pub quantity: Quantity,
    /// Measured value in quantity units
    pub value: f64,
    /// When the value was taken (first reading of the window for averages)
    pub timestamp: Timestamp,
}

/// Alert edge for one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub source_id: String,
    pub quantity: Quantity,
    pub kind: AlertKind,
    /// Profile value at the averaged timestamp
    pub expected: f64,
    /// Averaged value that triggered the alert
    pub actual: f64,
    /// `|actual - expected|`
    pub difference: f64,
    pub timestamp: Timestamp,
}

impl AlertEvent {
    pub fn from_deviation(average: &Reading, deviation: Deviation) -> Self {
        Self {
            source_id: average.source_id.clone(),
            quantity: average.quantity,
            kind: deviation.kind,
            expected: deviation.expected,
            actual: deviation.actual,
            difference: deviation.difference,
            timestamp: average.timestamp,
        }
    }
}

/// Subscription key for the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Sample,
    Average,
    Alert,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Sample, EventKind::Average, EventKind::Alert];

    pub const fn name(&self) -> &'static str {
        match self {
            EventKind::Sample => "sample",
            EventKind::Average => "average",
            EventKind::Alert => "alert",
        }
    }
}

/// Main event type published by the station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Raw probe reading
    Sample(Reading),
    /// Interval mean
    Average(Reading),
    /// Deviation edge
    Alert(AlertEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Sample(_) => EventKind::Sample,
            Event::Average(_) => EventKind::Average,
            Event::Alert(_) => EventKind::Alert,
        }
    }

    /// Get event timestamp
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Event::Sample(reading) | Event::Average(reading) => reading.timestamp,
            Event::Alert(alert) => alert.timestamp,
        }
    }

    pub fn source_id(&self) -> &str {
        match self {
            Event::Sample(reading) | Event::Average(reading) => &reading.source_id,
            Event::Alert(alert) => &alert.source_id,
        }
    }

    pub fn quantity(&self) -> Quantity {
        match self {
            Event::Sample(reading) | Event::Average(reading) => reading.quantity,
            Event::Alert(alert) => alert.quantity,
        }
    }
}
