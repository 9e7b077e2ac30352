//! Basic Station Example
//!
//! Builds a two-probe station on a manually advanced clock, pushes the
//! temperature probe off its profile and prints what the sinks would see.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use thermoguard_core::{
    Event, FixedClock, Milestone, MonitorResult, Profile, Quantity, Sink, SinkError, Station,
};

struct Printer;

impl Sink for Printer {
    fn name(&self) -> &str {
        "printer"
    }

    fn handle(&self, event: &Event) -> Result<(), SinkError> {
        match event {
            Event::Sample(_) => {}
            Event::Average(r) => println!("{} {} average {:.2}", r.timestamp, r.source_id, r.value),
            Event::Alert(a) => println!(
                "{} {} ALERT {} (expected {:.2}, off by {:.2})",
                a.timestamp,
                a.source_id,
                a.kind.as_str(),
                a.expected,
                a.difference
            ),
        }
        Ok(())
    }
}

fn main() -> MonitorResult<()> {
    let start = NaiveDate::from_ymd_opt(2024, 7, 14)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .unwrap_or_default();
    let clock = Arc::new(FixedClock::new(start));

    let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or_default();
    let temperature = Profile::new(vec![
        Milestone::new(at(6), 10.0),
        Milestone::new(at(15), 24.0),
        Milestone::new(at(21), 16.0),
    ])?;
    let humidity = Profile::evenly_spaced(vec![0.80, 0.55, 0.45, 0.70])?;

    let station = Station::builder("garden")
        .clock(clock.clone())
        .quantity(Quantity::Temperature, temperature)
        .quantity(Quantity::Humidity, humidity)
        .build()?;
    station.dispatcher().subscribe_all(Arc::new(Printer));

    for hour in 0..6 {
        if hour == 3 {
            // Heat wave: +12.5 °C on the temperature probe
            for _ in 0..25 {
                station.increase_offset("garden/temperature")?;
            }
        }
        for _ in 0..20 {
            station.sample_tick();
            clock.advance(Duration::milliseconds(100));
        }
        station.average_tick();
        clock.advance(Duration::hours(1));
    }

    Ok(())
}
