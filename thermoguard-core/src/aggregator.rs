//! Interval Aggregation Window
//!
//! The sampling driver appends readings; the averaging driver drains them.
//! Both go through one mutex so an `add` never interleaves with a `reduce`:
//! a reading lands either in the window being reduced or in the next one.
//!
//! `reduce` returns the plain arithmetic mean (not time-weighted), stamped
//! with the first reading's timestamp and source. An empty window yields
//! `None` and downstream stages skip the cycle instead of publishing a zero.

use std::sync::{Mutex, MutexGuard};

use crate::events::Reading;

/// Pending readings since the last reduce
#[derive(Debug, Default)]
pub struct Aggregator {
    window: Mutex<Vec<Reading>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading to the pending window
    pub fn add(&self, reading: Reading) {
        self.lock().push(reading);
    }

    /// Number of readings waiting to be reduced
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Drain the window into its mean; `None` when nothing was added
    pub fn reduce(&self) -> Option<Reading> {
        let window = std::mem::take(&mut *self.lock());
        let first = window.first()?;

        let sum: f64 = window.iter().map(|r| r.value).sum();
        let mean = sum / window.len() as f64;

        Some(Reading {
            source_id: first.source_id.clone(),
            quantity: first.quantity,
            value: mean,
            timestamp: first.timestamp,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Reading>> {
        // Readings are plain data; a panic elsewhere cannot leave them half-written
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
