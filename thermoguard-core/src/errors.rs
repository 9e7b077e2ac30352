//! Error Types for Simulation Configuration and Operator Commands
//!
//! ## Design Philosophy
//!
//! ThermoGuard separates failures into two groups:
//!
//! 1. **Configuration errors** are detected once, at construction time. A
//!    profile with no milestones or two milestones on the same anchor never
//!    reaches interpolation, so `Profile::expected_value` cannot fail.
//!
//! 2. **Command errors** come from the operator surface (unknown source id).
//!    They are reported back to the caller and never stop the pipeline.
//!
//! Runtime conditions that are *not* errors:
//! - An empty aggregation window at `reduce` yields `None`.
//! - A failing sink is isolated by the dispatcher and only logged.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use thermoguard_core::{MonitorError, Profile};
//!
//! match Profile::evenly_spaced(Vec::new()) {
//!     Ok(_) => unreachable!(),
//!     Err(MonitorError::InvalidProfile { reason }) => {
//!         // Fail fast: refuse to start the station
//!         assert!(reason.contains("milestone"));
//!     }
//!     Err(_) => {}
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for core operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors raised by the simulation core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// Profile cannot be interpolated (no milestones, duplicate anchors)
    #[error("Invalid profile: {reason}")]
    InvalidProfile {
        /// What is wrong with the milestone set
        reason: String,
    },

    /// Quantity settings out of their valid domain (negative noise, NaN threshold, ...)
    #[error("Invalid settings: {reason}")]
    InvalidSettings {
        /// Which setting was rejected
        reason: &'static str,
    },

    /// Command addressed a source the station does not own
    #[error("Unknown source: {source_id}")]
    UnknownSource {
        /// The id the operator asked for
        source_id: String,
    },

    /// Station built without any monitored quantity
    #[error("Station has no sources")]
    NoSources,
}

/// Failure reported by an event sink
///
/// The dispatcher logs these and moves on to the next sink; they never reach
/// the drivers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SinkError {
    /// Sink could not process the event (I/O, storage, formatting)
    #[error("Sink failed: {0}")]
    Failed(String),

    /// Sink was shut down and no longer accepts events
    #[error("Sink closed")]
    Closed,
}

impl SinkError {
    pub fn failed(reason: impl ToString) -> Self {
        Self::Failed(reason.to_string())
    }
}

impl MonitorError {
    pub(crate) fn invalid_profile(reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_source(source_id: &str) -> Self {
        Self::UnknownSource {
            source_id: source_id.to_owned(),
        }
    }
}
