//! Console display sink
//!
//! Renders events as one line each:
//!
//! ```text
//! [2024-07-14 12:00:00] lab/temperature sample: 20.37°C
//! [2024-07-14 12:00:02] lab/humidity average humidity: 48.20%
//! [2024-07-14 12:00:02] ALERT lab/temperature: overheating (expected 20.00°C, deviation 20.41°C)
//! ```
//!
//! Humidity travels through the core as a fraction and is shown as a
//! percentage here. Samples are only printed when asked for; at the default
//! 100 ms sampling period they drown everything else.

use std::{
    fmt::Write as _,
    io::{self, Write},
    sync::{Mutex, MutexGuard},
};

use thermoguard_core::{AlertKind, Event, Quantity, Sink, SinkError, Timestamp};

use crate::config::{DisplayConfig, DEFAULT_DATETIME_FORMAT};

/// Operator-facing label of an alert
pub fn alert_label(quantity: Quantity, kind: AlertKind) -> &'static str {
    match (quantity, kind) {
        (Quantity::Temperature, AlertKind::TooHigh) => "overheating",
        (Quantity::Temperature, AlertKind::TooLow) => "overcooling",
        (Quantity::Humidity, AlertKind::TooHigh) => "too humid",
        (Quantity::Humidity, AlertKind::TooLow) => "too dry",
    }
}

/// Line-oriented event printer
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
    datetime: String,
    decimals: usize,
    show_samples: bool,
}

impl ConsoleSink {
    pub fn new(out: Box<dyn Write + Send>, display: &DisplayConfig) -> Self {
        Self {
            out: Mutex::new(out),
            datetime: display.datetime.clone(),
            decimals: display.decimals,
            show_samples: false,
        }
    }

    pub fn stdout(display: &DisplayConfig) -> Self {
        Self::new(Box::new(io::stdout()), display)
    }

    /// Also print every raw sample
    pub fn show_samples(mut self, show: bool) -> Self {
        self.show_samples = show;
        self
    }

    /// Value with its display unit (`21.50°C`, `48.20%`)
    pub fn format_value(&self, quantity: Quantity, value: f64) -> String {
        let decimals = self.decimals;
        match quantity {
            Quantity::Temperature => format!("{value:.decimals$}{}", quantity.unit()),
            Quantity::Humidity => format!("{:.decimals$}%", value * 100.0),
        }
    }

    pub fn format_timestamp(&self, timestamp: &Timestamp) -> String {
        let mut out = String::new();
        if write!(out, "{}", timestamp.format(&self.datetime)).is_err() {
            out = timestamp.format(DEFAULT_DATETIME_FORMAT).to_string();
        }
        out
    }

    /// Line for `event`, `None` when it is not displayed
    pub fn render(&self, event: &Event) -> Option<String> {
        let line = match event {
            Event::Sample(reading) => {
                if !self.show_samples {
                    return None;
                }
                format!(
                    "[{}] {} sample: {}",
                    self.format_timestamp(&reading.timestamp),
                    reading.source_id,
                    self.format_value(reading.quantity, reading.value)
                )
            }
            Event::Average(reading) => format!(
                "[{}] {} average {}: {}",
                self.format_timestamp(&reading.timestamp),
                reading.source_id,
                reading.quantity.name(),
                self.format_value(reading.quantity, reading.value)
            ),
            Event::Alert(alert) => format!(
                "[{}] ALERT {}: {} (expected {}, deviation {})",
                self.format_timestamp(&alert.timestamp),
                alert.source_id,
                alert_label(alert.quantity, alert.kind),
                self.format_value(alert.quantity, alert.expected),
                self.format_value(alert.quantity, alert.difference)
            ),
        };
        Some(line)
    }

    /// Print an arbitrary line without interleaving with events
    pub fn say(&self, line: &str) -> io::Result<()> {
        let mut out = self.lock();
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn handle(&self, event: &Event) -> Result<(), SinkError> {
        match self.render(event) {
            Some(line) => self.say(&line).map_err(SinkError::failed),
            None => Ok(()),
        }
    }
}
