//! Connectors Between the ThermoGuard Core and the Outside World
//!
//! ## Overview
//!
//! The simulation core only produces typed events and accepts a handful of
//! commands. Everything that touches files, terminals or databases lives here:
//!
//! | Module      | Direction | Concern                                        |
//! |-------------|-----------|------------------------------------------------|
//! | [`ini`]     | in        | Minimal INI reader (sections, keys, comments)  |
//! | [`config`]  | in        | `StationConfig` from INI or JSON, core wiring  |
//! | [`console`] | out       | Human-readable rendering of events             |
//! | [`storage`] | out       | SQLite persistence of averages and alerts      |
//!
//! ## Sink Guidelines
//!
//! Console and storage both implement [`thermoguard_core::Sink`]. They are
//! called synchronously from the publishing tick, so:
//!
//! 1. Fast sinks (console) may be subscribed directly.
//! 2. Sinks doing disk I/O (storage) should be wrapped in a
//!    [`thermoguard_core::QueuedSink`].
//! 3. A sink never panics on bad data; it returns a `SinkError` and the
//!    dispatcher logs it.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use thermoguard_connectors::{config::StationConfig, console::ConsoleSink};
//!
//! let config = StationConfig::load("station.ini")?;
//! let station = config.station_builder()?.build()?;
//!
//! let console = Arc::new(ConsoleSink::stdout(&config.display));
//! station.dispatcher().subscribe_all(console);
//! # Ok::<(), thermoguard_connectors::ConnectorError>(())
//! ```

pub mod config;
pub mod console;
pub mod ini;

#[cfg(feature = "sqlite")]
pub mod storage;

// Re-export common types
pub use config::{DisplayConfig, MilestoneConfig, ProfileConfig, StationConfig, StorageConfig, TimingConfig};
pub use console::ConsoleSink;
pub use ini::IniDocument;

#[cfg(feature = "sqlite")]
pub use storage::SqliteSink;

use thermoguard_core::MonitorError;
use thiserror::Error;

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error at line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("Missing key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

impl ConnectorError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
