//! Core simulation engine for ThermoGuard
//!
//! Simulates environmental probes (temperature, humidity) that follow a
//! time-of-day target profile, averages their readings per interval and
//! raises edge-triggered alerts when an average drifts away from the target.
//!
//! Key properties:
//! - Piecewise-linear profile interpolation across the midnight wrap
//! - Lock-free operator offsets, one mutex per aggregation window
//! - Typed events fanned out to isolated sinks
//!
//! ```no_run
//! use std::sync::Arc;
//! use thermoguard_core::{Profile, Quantity, Station};
//!
//! let station = Station::builder("greenhouse")
//!     .quantity(Quantity::Temperature, Profile::evenly_spaced(vec![12.0, 18.0, 24.0, 16.0])?)
//!     .build()?;
//!
//! station.sample_tick();
//! station.average_tick();
//! station.increase_offset("greenhouse/temperature")?;
//! # Ok::<(), thermoguard_core::MonitorError>(())
//! ```

#![deny(unsafe_code)]

pub mod aggregator;
pub mod alert;
pub mod constants;
pub mod dispatcher;
#[cfg(feature = "runtime")]
pub mod driver;
pub mod errors;
pub mod events;
pub mod probe;
pub mod profile;
pub mod quantity;
pub mod station;
pub mod time;

// Public API
pub use aggregator::Aggregator;
pub use alert::{AlertEvaluator, AlertKind, AlertState, AlertThresholds, Deviation};
pub use dispatcher::{Delivery, Dispatcher, QueuedSink, Sink};
#[cfg(feature = "runtime")]
pub use driver::{DriverConfig, Drivers};
pub use errors::{MonitorError, MonitorResult, SinkError};
pub use events::{AlertEvent, Event, EventKind, Reading};
pub use probe::{DriftOffset, NoNoise, NoiseSource, Probe, UniformNoise};
pub use profile::{Milestone, Profile};
pub use quantity::{Quantity, QuantitySettings};
pub use station::{Channel, Station, StationBuilder};
pub use time::{Clock, FixedClock, SystemClock, Timestamp};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
