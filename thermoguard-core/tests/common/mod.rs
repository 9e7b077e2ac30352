//! Common fixtures for integration tests
//!
//! This module provides:
//! - A recording sink that keeps every event it receives
//! - Misbehaving sinks (erroring, panicking) for isolation tests
//! - Deterministic stations on a fixed clock without noise

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};
use thermoguard_core::{
    AlertEvent, Dispatcher, Event, EventKind, FixedClock, Milestone, NoNoise, Profile, Quantity,
    Reading, Sink, SinkError, Station, Timestamp,
};

/// Sink remembering every event, in delivery order
#[derive(Default)]
pub struct RecordingSink {
    name: String,
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn named(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().unwrap().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn count_for(&self, kind: EventKind, source_id: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == kind && e.source_id() == source_id)
            .count()
    }

    pub fn averages(&self) -> Vec<Reading> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Average(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<AlertEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Alert(a) => Some(a.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Sink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &Event) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Sink that always reports a failure
pub struct FailingSink;

impl Sink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn handle(&self, _event: &Event) -> Result<(), SinkError> {
        Err(SinkError::failed("database is locked"))
    }
}

/// Sink that panics on every event
pub struct PanickingSink;

impl Sink for PanickingSink {
    fn name(&self) -> &str {
        "panicking"
    }

    fn handle(&self, event: &Event) -> Result<(), SinkError> {
        panic!("cannot render {}", event.source_id())
    }
}

pub fn at(h: u32, m: u32, s: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 7, 14)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// 06:00 → 10.0, 18:00 → 20.0
pub fn day_night_profile() -> Profile {
    Profile::new(vec![Milestone::new(hm(6, 0), 10.0), Milestone::new(hm(18, 0), 20.0)]).unwrap()
}

pub struct Fixture {
    pub station: Arc<Station>,
    pub clock: Arc<FixedClock>,
    pub dispatcher: Arc<Dispatcher>,
    pub sink: Arc<RecordingSink>,
}

/// Noise-free "lab" station at 12:00 with a constant temperature and humidity
pub fn lab_station(temperature: f64, humidity: f64) -> Fixture {
    let clock = Arc::new(FixedClock::new(at(12, 0, 0)));
    let dispatcher = Arc::new(Dispatcher::new());
    let sink = RecordingSink::named("recording");
    dispatcher.subscribe_all(sink.clone());

    let station = Station::builder("lab")
        .clock(clock.clone())
        .dispatcher(Arc::clone(&dispatcher))
        .quantity(Quantity::Temperature, Profile::constant(temperature).unwrap())
        .quantity(Quantity::Humidity, Profile::constant(humidity).unwrap())
        .noise(|_, _| Box::new(NoNoise))
        .build()
        .unwrap();

    Fixture {
        station: Arc::new(station),
        clock,
        dispatcher,
        sink,
    }
}
