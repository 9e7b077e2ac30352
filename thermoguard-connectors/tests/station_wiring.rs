//! End-to-end wiring: config file → station → console and SQLite sinks

mod common;

use std::sync::Arc;

use thermoguard_connectors::{ConnectorError, ConsoleSink, SqliteSink, StationConfig};
use thermoguard_core::{EventKind, FixedClock, QueuedSink};

use common::{noon, write_file, SharedBuffer, LAB_INI};

#[test]
fn test_ini_file_to_console() {
    let (_dir, path) = write_file("lab.ini", LAB_INI);
    let config = StationConfig::load(&path).unwrap();

    let station = config
        .station_builder()
        .unwrap()
        .clock(Arc::new(FixedClock::new(noon())))
        .build()
        .unwrap();

    let buffer = SharedBuffer::default();
    let console = Arc::new(ConsoleSink::new(Box::new(buffer.clone()), &config.display));
    station.dispatcher().subscribe_all(console);

    for _ in 0..40 {
        station.increase_offset("lab/temperature").unwrap();
    }
    station.sample_tick();
    station.average_tick();

    assert_eq!(
        buffer.lines(),
        vec![
            "[12:00:00] lab/temperature average temperature: 40.0°C",
            "[12:00:00] ALERT lab/temperature: overheating (expected 20.0°C, deviation 20.0°C)",
            "[12:00:00] lab/humidity average humidity: 50.0%",
        ]
    );
}

#[test]
fn test_averages_and_alerts_persisted_through_queue() {
    let (dir, path) = write_file("lab.ini", LAB_INI);
    let config = StationConfig::load(&path).unwrap();
    let station = config
        .station_builder()
        .unwrap()
        .clock(Arc::new(FixedClock::new(noon())))
        .build()
        .unwrap();

    let db_path = dir.path().join("lab.db");
    let storage = Arc::new(SqliteSink::open(&db_path).unwrap());
    let queued = Arc::new(QueuedSink::spawn(storage.clone()).unwrap());
    station.dispatcher().subscribe(EventKind::Average, queued.clone());
    station.dispatcher().subscribe(EventKind::Alert, queued.clone());

    for _ in 0..3 {
        station.sample_tick();
        station.average_tick();
    }
    for _ in 0..40 {
        station.decrease_offset("lab/temperature").unwrap();
    }
    station.sample_tick();
    station.average_tick();
    queued.shutdown();

    // 4 cycles x 2 sources
    assert_eq!(storage.measurement_count().unwrap(), 8);
    let alerts = storage.alerts().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].source, "lab/temperature");
    assert_eq!(alerts[0].kind, "too_low");
    // Last temperature average is the 7th row (temperature before humidity each cycle)
    assert_eq!(alerts[0].measurement_id, Some(7));

    // Rows survive reopening the file
    drop(storage);
    let reopened = SqliteSink::open(&db_path).unwrap();
    assert_eq!(reopened.measurement_count().unwrap(), 8);
}

#[test]
fn test_json_file_is_detected_by_extension() {
    let json = r#"{ "name": "cellar", "temperature": { "milestones": [12.0, 14.0] } }"#;
    let (_dir, path) = write_file("cellar.JSON", json);
    let config = StationConfig::load(&path).unwrap();
    assert_eq!(config.name, "cellar");
    assert!(config.humidity.is_none());

    let station = config.station_builder().unwrap().build().unwrap();
    assert_eq!(station.source_ids(), ["cellar/temperature"]);
}

#[test]
fn test_load_errors() {
    let missing = StationConfig::load("/definitely/not/here.ini");
    assert!(matches!(missing, Err(ConnectorError::Io(_))));

    let (_dir, path) = write_file("broken.json", "{ name: ");
    assert!(matches!(StationConfig::load(&path), Err(ConnectorError::Json(_))));

    let (_dir, path) = write_file("empty.ini", "[general]\nname = empty\n");
    let config = StationConfig::load(&path).unwrap();
    let result = config.station_builder().unwrap().build();
    assert!(matches!(result, Err(thermoguard_core::MonitorError::NoSources)));
}

#[test]
fn test_demo_configs_load() {
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos");

    let greenhouse = StationConfig::load(demos.join("greenhouse.ini")).unwrap();
    assert_eq!(greenhouse.storage.path.as_deref(), Some(std::path::Path::new("greenhouse.db")));
    let station = greenhouse.station_builder().unwrap().build().unwrap();
    assert_eq!(station.source_ids(), ["greenhouse/temperature", "greenhouse/humidity"]);

    let cellar = StationConfig::load(demos.join("cellar.json")).unwrap();
    assert_eq!(cellar.timing.average_ms, 5000);
    assert!(cellar.station_builder().unwrap().build().is_ok());
}
