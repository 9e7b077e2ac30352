//! Station: the Composed Simulation Pipeline
//!
//! ## Overview
//!
//! A station owns one [`Channel`] per monitored quantity. Each channel
//! bundles the pieces that belong to a single source:
//!
//! ```text
//!            ┌──────────────────── Channel "lab/temperature" ───────────────────┐
//! sample ──▶ │ Probe ──▶ Aggregator ──┐                                          │
//!  tick      │                        │ reduce                                   │
//! average ──▶│                        └──▶ mean ──▶ AlertEvaluator(profile(t))   │
//!  tick      └──────────────────────────────────────────────────────────────────┘
//!                    │ Sample              │ Average             │ Alert
//!                    └─────────────────────┴──────────┬──────────┘
//!                                                Dispatcher
//! ```
//!
//! ## Concurrency
//!
//! The station is shared behind an `Arc` by the sampling driver, the
//! averaging driver and the operator's command loop:
//!
//! - The probe sits behind its own mutex, held only for one `sample` call.
//! - Offsets are atomics; a command never waits for a tick.
//! - The aggregation window is the single add/reduce exclusion point.
//! - The evaluator is only fed by the averaging tick.
//!
//! No lock is held while events are published, so a slow sink can never
//! stall a command and a sink may call back into the station.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard,
};

use crate::{
    aggregator::Aggregator,
    alert::{AlertEvaluator, AlertState},
    dispatcher::Dispatcher,
    errors::{MonitorError, MonitorResult},
    events::{AlertEvent, Event},
    probe::{DriftOffset, NoiseSource, Probe, UniformNoise},
    profile::Profile,
    quantity::{Quantity, QuantitySettings},
    time::{Clock, SystemClock},
};

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Everything one source needs between two averaging cycles
pub struct Channel {
    source_id: String,
    quantity: Quantity,
    settings: QuantitySettings,
    profile: Arc<Profile>,
    probe: Mutex<Probe>,
    offset: DriftOffset,
    aggregator: Aggregator,
    evaluator: Mutex<AlertEvaluator>,
}

impl Channel {
    fn new(
        source_id: String,
        quantity: Quantity,
        profile: Profile,
        settings: QuantitySettings,
        noise: Box<dyn NoiseSource>,
    ) -> Self {
        let profile = Arc::new(profile);
        let probe = Probe::new(
            source_id.clone(),
            quantity,
            Arc::clone(&profile),
            noise,
            settings.offset_step,
        );
        let offset = probe.offset_handle();

        Self {
            source_id,
            quantity,
            settings,
            profile,
            probe: Mutex::new(probe),
            offset,
            aggregator: Aggregator::new(),
            evaluator: Mutex::new(AlertEvaluator::new(settings.thresholds)),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn settings(&self) -> &QuantitySettings {
        &self.settings
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Current drift offset
    pub fn offset(&self) -> f64 {
        self.offset.get()
    }

    /// Readings waiting for the next averaging tick
    pub fn pending(&self) -> usize {
        self.aggregator.pending()
    }

    pub fn alert_state(&self) -> AlertState {
        relock(&self.evaluator).state()
    }

    fn increase(&self) -> f64 {
        relock(&self.probe).increase()
    }

    fn decrease(&self) -> f64 {
        relock(&self.probe).decrease()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("source_id", &self.source_id)
            .field("quantity", &self.quantity)
            .field("offset", &self.offset.get())
            .field("pending", &self.aggregator.pending())
            .finish()
    }
}

/// Composed probe/aggregate/alert pipeline for one named station
pub struct Station {
    name: String,
    channels: Vec<Channel>,
    active: AtomicUsize,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<Dispatcher>,
}

impl Station {
    pub fn builder(name: impl Into<String>) -> StationBuilder {
        StationBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Sampling tick: one reading per channel, added and published
    pub fn sample_tick(&self) {
        let now = self.clock.now();
        for channel in &self.channels {
            let reading = relock(&channel.probe).sample(now);
            channel.aggregator.add(reading.clone());
            self.dispatcher.publish(&Event::Sample(reading));
        }
    }

    /// Averaging tick: reduce every window, publish averages and alert edges
    ///
    /// Returns how many averages were emitted. Channels whose window is empty
    /// are skipped without touching their evaluator.
    pub fn average_tick(&self) -> usize {
        let mut emitted = 0;
        for channel in &self.channels {
            let Some(average) = channel.aggregator.reduce() else {
                log::trace!("{}: empty window, skipping cycle", channel.source_id);
                continue;
            };
            emitted += 1;

            let expected = channel.profile.expected_value(average.timestamp.time());
            log::debug!(
                "{}: average {:.3} (expected {:.3})",
                average.source_id,
                average.value,
                expected
            );
            let deviation = relock(&channel.evaluator).evaluate(average.value, expected);
            let alert = deviation.map(|d| AlertEvent::from_deviation(&average, d));

            self.dispatcher.publish(&Event::Average(average));

            if let Some(alert) = alert {
                log::info!(
                    "{}: {} alert (expected {:.3}, actual {:.3}, difference {:.3})",
                    alert.source_id,
                    alert.kind.as_str(),
                    alert.expected,
                    alert.actual,
                    alert.difference
                );
                self.dispatcher.publish(&Event::Alert(alert));
            }
        }
        emitted
    }

    /// Ids of every source, in channel order
    pub fn source_ids(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.source_id.as_str()).collect()
    }

    pub fn channel(&self, source_id: &str) -> MonitorResult<&Channel> {
        self.channels
            .iter()
            .find(|c| c.source_id == source_id)
            .ok_or_else(|| MonitorError::unknown_source(source_id))
    }

    pub fn offset(&self, source_id: &str) -> MonitorResult<f64> {
        Ok(self.channel(source_id)?.offset())
    }

    /// Raise a source's offset by one step; returns the new offset
    pub fn increase_offset(&self, source_id: &str) -> MonitorResult<f64> {
        let channel = self.channel(source_id)?;
        let offset = channel.increase();
        log::info!("{}: offset raised to {:+.3}", source_id, offset);
        Ok(offset)
    }

    /// Lower a source's offset by one step; returns the new offset
    pub fn decrease_offset(&self, source_id: &str) -> MonitorResult<f64> {
        let channel = self.channel(source_id)?;
        let offset = channel.decrease();
        log::info!("{}: offset lowered to {:+.3}", source_id, offset);
        Ok(offset)
    }

    /// Source the unqualified commands apply to
    pub fn active_source(&self) -> &str {
        &self.active_channel().source_id
    }

    pub fn select_active_source(&self, source_id: &str) -> MonitorResult<()> {
        let index = self
            .channels
            .iter()
            .position(|c| c.source_id == source_id)
            .ok_or_else(|| MonitorError::unknown_source(source_id))?;
        self.active.store(index, Ordering::Release);
        log::info!("active source: {}", source_id);
        Ok(())
    }

    /// Move the active source to the next channel, wrapping around
    pub fn cycle_active_source(&self) -> &str {
        let count = self.channels.len();
        let previous = self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % count))
            .unwrap_or_else(|current| current);
        let next = &self.channels[(previous + 1) % count].source_id;
        log::info!("active source: {}", next);
        next
    }

    pub fn increase_active(&self) -> f64 {
        let channel = self.active_channel();
        let offset = channel.increase();
        log::info!("{}: offset raised to {:+.3}", channel.source_id, offset);
        offset
    }

    pub fn decrease_active(&self) -> f64 {
        let channel = self.active_channel();
        let offset = channel.decrease();
        log::info!("{}: offset lowered to {:+.3}", channel.source_id, offset);
        offset
    }

    fn active_channel(&self) -> &Channel {
        // Index is always stored modulo the (non-empty) channel count
        &self.channels[self.active.load(Ordering::Acquire) % self.channels.len()]
    }
}

impl std::fmt::Debug for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Station")
            .field("name", &self.name)
            .field("channels", &self.channels)
            .field("active", &self.active_source())
            .finish()
    }
}

type NoiseFactory = Box<dyn Fn(Quantity, &QuantitySettings) -> Box<dyn NoiseSource>>;

/// Builder for [`Station`]
///
/// ```rust
/// use thermoguard_core::{Profile, Quantity, Station};
///
/// let station = Station::builder("lab")
///     .quantity(Quantity::Temperature, Profile::constant(20.0).unwrap())
///     .quantity(Quantity::Humidity, Profile::constant(0.5).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(station.source_ids(), ["lab/temperature", "lab/humidity"]);
/// ```
pub struct StationBuilder {
    name: String,
    clock: Option<Arc<dyn Clock>>,
    dispatcher: Option<Arc<Dispatcher>>,
    quantities: Vec<(Quantity, Profile, QuantitySettings)>,
    noise: Option<NoiseFactory>,
}

impl StationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clock: None,
            dispatcher: None,
            quantities: Vec::new(),
            noise: None,
        }
    }

    /// Time source for readings (defaults to the local wall clock)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Dispatcher to publish into (defaults to a fresh one)
    pub fn dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Monitor `quantity` against `profile` with its default settings
    pub fn quantity(self, quantity: Quantity, profile: Profile) -> Self {
        self.quantity_with(quantity, profile, quantity.default_settings())
    }

    /// Monitor `quantity` with explicit settings; replaces an earlier entry
    pub fn quantity_with(
        mut self,
        quantity: Quantity,
        profile: Profile,
        settings: QuantitySettings,
    ) -> Self {
        self.quantities.retain(|(q, _, _)| *q != quantity);
        self.quantities.push((quantity, profile, settings));
        self
    }

    /// Replace the uniform reading error with a custom source
    pub fn noise<F>(mut self, factory: F) -> Self
    where
        F: Fn(Quantity, &QuantitySettings) -> Box<dyn NoiseSource> + 'static,
    {
        self.noise = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> MonitorResult<Station> {
        if self.quantities.is_empty() {
            return Err(MonitorError::NoSources);
        }

        let mut channels = Vec::with_capacity(self.quantities.len());
        for (quantity, profile, settings) in self.quantities {
            settings.validate()?;
            let noise = match &self.noise {
                Some(factory) => factory(quantity, &settings),
                None => Box::new(UniformNoise::new(settings.noise_magnitude)),
            };
            let source_id = format!("{}/{}", self.name, quantity.name());
            log::debug!(
                "channel {}: {} milestones, noise ±{}, step {}",
                source_id,
                profile.milestones().len(),
                settings.noise_magnitude,
                settings.offset_step
            );
            channels.push(Channel::new(source_id, quantity, profile, settings, noise));
        }

        log::info!("station '{}' ready with {} sources", self.name, channels.len());
        Ok(Station {
            name: self.name,
            channels,
            active: AtomicUsize::new(0),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            dispatcher: self.dispatcher.unwrap_or_default(),
        })
    }
}
