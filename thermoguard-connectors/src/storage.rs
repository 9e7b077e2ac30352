//! SQLite persistence sink
//!
//! ## Schema
//!
//! ```text
//! measurement                          alert
//! ┌────────────┬─────────┐             ┌────────────────┬─────────┐
//! │ id         │ INTEGER │◀────────────│ measurement_id │ INTEGER │ (nullable)
//! │ source     │ TEXT    │             │ id             │ INTEGER │
//! │ quantity   │ TEXT    │             │ source         │ TEXT    │
//! │ value      │ REAL    │             │ kind           │ TEXT    │
//! │ timestamp  │ TEXT    │             │ expected       │ REAL    │
//! └────────────┴─────────┘             │ difference     │ REAL    │
//!                                      │ timestamp      │ TEXT    │
//!                                      └────────────────┴─────────┘
//! ```
//!
//! Only averages and alerts are stored. Each insert runs in its own
//! transaction; a failed insert rolls back and is reported to the dispatcher
//! without affecting later inserts. An alert row points at the most recent
//! average stored for the same source, which is the average that raised it
//! since the station publishes an alert right after its average.
//!
//! Inserts block on disk I/O; subscribe this sink through a
//! [`thermoguard_core::QueuedSink`].

use std::{
    collections::HashMap,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use rusqlite::{params, Connection};
use thermoguard_core::{AlertEvent, Event, Reading, Sink, SinkError, Timestamp};

use crate::ConnectorResult;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS measurement (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    source      TEXT    NOT NULL,
    quantity    TEXT    NOT NULL,
    value       REAL    NOT NULL,
    timestamp   TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS alert (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    measurement_id  INTEGER REFERENCES measurement(id),
    source          TEXT    NOT NULL,
    kind            TEXT    NOT NULL,
    expected        REAL    NOT NULL,
    difference      REAL    NOT NULL,
    timestamp       TEXT    NOT NULL
);
";

/// Stored alert row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAlert {
    pub id: i64,
    pub measurement_id: Option<i64>,
    pub source: String,
    pub kind: String,
    pub expected: f64,
    pub difference: f64,
    pub timestamp: String,
}

/// Persists averages and alerts into SQLite
pub struct SqliteSink {
    conn: Mutex<Connection>,
    /// Last measurement id per source
    last_measurement: Mutex<HashMap<String, i64>>,
}

impl SqliteSink {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        log::info!("persisting to {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> ConnectorResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> ConnectorResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            last_measurement: Mutex::new(HashMap::new()),
        })
    }

    /// Store an average; returns its row id
    pub fn insert_measurement(&self, reading: &Reading) -> ConnectorResult<i64> {
        let id = {
            let mut conn = self.conn();
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO measurement (source, quantity, value, timestamp) VALUES (?1, ?2, ?3, ?4)",
                params![
                    reading.source_id,
                    reading.quantity.name(),
                    reading.value,
                    iso(&reading.timestamp)
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            id
        };

        self.last_measurement
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(reading.source_id.clone(), id);
        Ok(id)
    }

    /// Store an alert linked to the source's latest measurement; returns its row id
    pub fn insert_alert(&self, alert: &AlertEvent) -> ConnectorResult<i64> {
        let measurement_id = self
            .last_measurement
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&alert.source_id)
            .copied();

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO alert (measurement_id, source, kind, expected, difference, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                measurement_id,
                alert.source_id,
                alert.kind.as_str(),
                alert.expected,
                alert.difference,
                iso(&alert.timestamp)
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    pub fn measurement_count(&self) -> ConnectorResult<i64> {
        Ok(self
            .conn()
            .query_row("SELECT COUNT(*) FROM measurement", [], |row| row.get(0))?)
    }

    /// All alerts, oldest first
    pub fn alerts(&self) -> ConnectorResult<Vec<StoredAlert>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, measurement_id, source, kind, expected, difference, timestamp \
             FROM alert ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredAlert {
                id: row.get(0)?,
                measurement_id: row.get(1)?,
                source: row.get(2)?,
                kind: row.get(3)?,
                expected: row.get(4)?,
                difference: row.get(5)?,
                timestamp: row.get(6)?,
            })
        })?;
        let alerts = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(alerts)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn iso(timestamp: &Timestamp) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

impl Sink for SqliteSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn handle(&self, event: &Event) -> Result<(), SinkError> {
        let result = match event {
            Event::Sample(_) => return Ok(()),
            Event::Average(reading) => self.insert_measurement(reading),
            Event::Alert(alert) => self.insert_alert(alert),
        };

        result.map(|_| ()).map_err(SinkError::failed)
    }
}
