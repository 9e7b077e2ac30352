//! Integration tests for the station pipeline
//!
//! Tests the complete data flow from probe sampling through aggregation,
//! alert evaluation and dispatch to sinks.

mod common;

use std::sync::Arc;

use chrono::Duration;
use thermoguard_core::{
    AlertKind, AlertState, Delivery, Dispatcher, Event, EventKind, MonitorError, NoNoise,
    Quantity, QueuedSink, Station,
};

use common::{at, day_night_profile, lab_station, FailingSink, PanickingSink, RecordingSink};

#[test]
fn test_samples_and_averages_reach_sinks() {
    let fx = lab_station(21.0, 0.45);

    for _ in 0..20 {
        fx.station.sample_tick();
    }
    assert_eq!(fx.sink.count(EventKind::Sample), 40);
    assert_eq!(fx.station.average_tick(), 2);

    let averages = fx.sink.averages();
    assert_eq!(averages.len(), 2);
    assert_eq!(averages[0].source_id, "lab/temperature");
    assert_eq!(averages[0].value, 21.0);
    assert_eq!(averages[1].source_id, "lab/humidity");
    assert!((averages[1].value - 0.45).abs() < 1e-12);
    assert!(fx.sink.alerts().is_empty());
}

#[test]
fn test_empty_window_emits_nothing() {
    let fx = lab_station(21.0, 0.45);
    assert_eq!(fx.station.average_tick(), 0);
    assert!(fx.sink.events().is_empty());
}

#[test]
fn test_alert_is_edge_triggered_across_cycles() {
    let fx = lab_station(20.0, 0.5);
    let station = &fx.station;

    // +20 °C over a 20 °C target: beyond 10% and beyond 10 °C
    for _ in 0..40 {
        station.increase_offset("lab/temperature").unwrap();
    }

    for _ in 0..3 {
        station.sample_tick();
        station.average_tick();
    }
    let alerts = fx.sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::TooHigh);
    assert_eq!(alerts[0].expected, 20.0);
    assert_eq!(alerts[0].actual, 40.0);
    assert_eq!(alerts[0].difference, 20.0);

    // Back on target: silent clear
    for _ in 0..40 {
        station.decrease_offset("lab/temperature").unwrap();
    }
    station.sample_tick();
    station.average_tick();
    assert_eq!(fx.sink.alerts().len(), 1);
    assert_eq!(
        station.channel("lab/temperature").unwrap().alert_state(),
        AlertState::Normal
    );

    // Deviating again re-fires
    for _ in 0..40 {
        station.decrease_offset("lab/temperature").unwrap();
    }
    station.sample_tick();
    station.average_tick();
    let alerts = fx.sink.alerts();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[1].kind, AlertKind::TooLow);
}

#[test]
fn test_humidity_alert_on_fraction_scale() {
    let fx = lab_station(20.0, 0.5);
    fx.station.select_active_source("lab/humidity").unwrap();

    // 0.5 + 4 * 0.04 = 0.66: beyond 10% of 0.5 and beyond 0.1
    for _ in 0..4 {
        fx.station.increase_active();
    }
    fx.station.sample_tick();
    fx.station.average_tick();

    let alerts = fx.sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].source_id, "lab/humidity");
    assert_eq!(alerts[0].quantity, Quantity::Humidity);
    assert_eq!(alerts[0].kind, AlertKind::TooHigh);
}

#[test]
fn test_alert_follows_average() {
    let fx = lab_station(20.0, 0.5);
    for _ in 0..40 {
        fx.station.increase_offset("lab/temperature").unwrap();
    }
    fx.station.sample_tick();
    fx.station.average_tick();

    let kinds: Vec<EventKind> = fx
        .sink
        .events()
        .iter()
        .filter(|e| e.source_id() == "lab/temperature")
        .map(Event::kind)
        .collect();
    assert_eq!(kinds, vec![EventKind::Sample, EventKind::Average, EventKind::Alert]);
}

#[test]
fn test_profile_drives_expected_value() {
    let clock = Arc::new(thermoguard_core::FixedClock::new(at(21, 0, 0)));
    let sink = RecordingSink::named("recording");
    let dispatcher = Arc::new(Dispatcher::new());
    dispatcher.subscribe(EventKind::Average, sink.clone());

    let station = Station::builder("attic")
        .clock(clock.clone())
        .dispatcher(dispatcher)
        .quantity(Quantity::Temperature, day_night_profile())
        .noise(|_, _| Box::new(NoNoise))
        .build()
        .unwrap();

    station.sample_tick();
    station.average_tick();
    clock.advance(Duration::hours(12));
    station.sample_tick();
    station.average_tick();

    let values: Vec<f64> = sink.averages().iter().map(|r| r.value).collect();
    assert_eq!(values, vec![17.5, 12.5]);
}

#[test]
fn test_failing_and_panicking_sinks_are_isolated() {
    let fx = lab_station(20.0, 0.5);
    let after = RecordingSink::named("after");

    fx.dispatcher.subscribe(EventKind::Sample, Arc::new(FailingSink));
    fx.dispatcher.subscribe(EventKind::Sample, Arc::new(PanickingSink));
    fx.dispatcher.subscribe(EventKind::Sample, after.clone());

    fx.station.sample_tick();
    fx.station.sample_tick();

    // Pipeline keeps running and later sinks still get everything
    assert_eq!(after.count(EventKind::Sample), 4);
    assert_eq!(fx.sink.count(EventKind::Sample), 4);
    assert_eq!(fx.station.average_tick(), 2);

    let report = fx.dispatcher.publish(&fx.sink.events()[0]);
    assert_eq!(report, Delivery { delivered: 2, failed: 2 });
}

#[test]
fn test_queued_sink_preserves_order() {
    let fx = lab_station(20.0, 0.5);
    let inner = RecordingSink::named("slow");
    let queued = Arc::new(QueuedSink::spawn(inner.clone()).unwrap());
    fx.dispatcher.subscribe(EventKind::Sample, queued.clone());

    for _ in 0..25 {
        fx.station.sample_tick();
        fx.clock.advance(Duration::milliseconds(100));
    }
    queued.shutdown();

    let stamps: Vec<_> = inner
        .events()
        .iter()
        .filter(|e| e.source_id() == "lab/temperature")
        .map(Event::timestamp)
        .collect();
    assert_eq!(stamps.len(), 25);
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_commands_reject_unknown_sources() {
    let fx = lab_station(20.0, 0.5);
    let unknown = MonitorError::UnknownSource {
        source_id: "lab/co2".into(),
    };

    assert_eq!(fx.station.increase_offset("lab/co2"), Err(unknown.clone()));
    assert_eq!(fx.station.decrease_offset("lab/co2"), Err(unknown.clone()));
    assert_eq!(fx.station.select_active_source("lab/co2"), Err(unknown.clone()));
    assert_eq!(fx.station.offset("lab/co2"), Err(unknown));

    // Nothing changed
    assert_eq!(fx.station.active_source(), "lab/temperature");
    assert_eq!(fx.station.offset("lab/temperature"), Ok(0.0));
}

#[test]
fn test_offsets_are_independent_per_source() {
    let fx = lab_station(20.0, 0.5);
    fx.station.increase_offset("lab/temperature").unwrap();
    fx.station.increase_offset("lab/temperature").unwrap();
    fx.station.decrease_offset("lab/humidity").unwrap();

    assert_eq!(fx.station.offset("lab/temperature"), Ok(1.0));
    assert_eq!(fx.station.offset("lab/humidity"), Ok(-0.04));
    assert_eq!(fx.station.source_ids(), ["lab/temperature", "lab/humidity"]);
}
