//! Periodic Drivers
//!
//! Two tokio tasks feed a shared [`Station`]:
//!
//! ```text
//! sampling  ─┬─ t=0 ── t=100ms ── t=200ms ── ...   station.sample_tick()
//! averaging ─┴────────────────────────── t=2s ── t=4s ── ...   station.average_tick()
//! ```
//!
//! The sampling task ticks immediately, the averaging task only after one
//! full interval so its first window is populated. A late tick is skipped
//! rather than replayed in a burst.
//!
//! ## Shutdown
//!
//! [`Drivers::stop`] flips a `watch` flag and awaits both tasks. Tick bodies
//! are synchronous, so a tick that already started always completes and no
//! tick starts after `stop` returns.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, interval_at, Instant, Interval, MissedTickBehavior},
};

use crate::{
    constants::{DEFAULT_AVERAGE_INTERVAL_MS, DEFAULT_SAMPLE_INTERVAL_MS},
    errors::{MonitorError, MonitorResult},
    station::Station,
};

/// Tick periods for the two drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub sample_interval: Duration,
    pub average_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::from_millis(DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_AVERAGE_INTERVAL_MS)
    }
}

impl DriverConfig {
    pub fn from_millis(sample_ms: u64, average_ms: u64) -> Self {
        Self {
            sample_interval: Duration::from_millis(sample_ms),
            average_interval: Duration::from_millis(average_ms),
        }
    }

    pub fn validate(&self) -> MonitorResult<()> {
        if self.sample_interval.is_zero() {
            return Err(MonitorError::InvalidSettings {
                reason: "sample interval must be positive",
            });
        }
        if self.average_interval.is_zero() {
            return Err(MonitorError::InvalidSettings {
                reason: "average interval must be positive",
            });
        }
        Ok(())
    }
}

/// Handle on the running sampling and averaging tasks
#[derive(Debug)]
pub struct Drivers {
    shutdown: watch::Sender<bool>,
    sampling: JoinHandle<()>,
    averaging: JoinHandle<()>,
}

impl Drivers {
    /// Start both drivers on the current tokio runtime
    pub fn spawn(station: Arc<Station>, config: DriverConfig) -> MonitorResult<Self> {
        config.validate()?;
        let (shutdown, stop_rx) = watch::channel(false);

        let mut sample_ticker = interval(config.sample_interval);
        sample_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let sampler = Arc::clone(&station);
        let sampling = tokio::spawn(run_periodic(
            "sampling",
            sample_ticker,
            stop_rx.clone(),
            move || sampler.sample_tick(),
        ));

        let mut average_ticker = interval_at(
            Instant::now() + config.average_interval,
            config.average_interval,
        );
        average_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let averaging = tokio::spawn(run_periodic(
            "averaging",
            average_ticker,
            stop_rx,
            move || {
                station.average_tick();
            },
        ));

        log::info!(
            "drivers started (sample every {:?}, average every {:?})",
            config.sample_interval,
            config.average_interval
        );

        Ok(Self {
            shutdown,
            sampling,
            averaging,
        })
    }

    /// Signal both drivers and wait until they have exited
    pub async fn stop(self) {
        // Receivers live inside the tasks; a send error means both already exited
        let _ = self.shutdown.send(true);

        for (name, handle) in [("sampling", self.sampling), ("averaging", self.averaging)] {
            if let Err(err) = handle.await {
                log::warn!("{} driver ended abnormally: {}", name, err);
            }
        }
        log::info!("drivers stopped");
    }
}

async fn run_periodic<F>(
    name: &'static str,
    mut ticker: Interval,
    mut stop: watch::Receiver<bool>,
    tick: F,
) where
    F: Fn() + Send + 'static,
{
    loop {
        tokio::select! {
            biased;
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => tick(),
        }
    }
    log::debug!("{} driver exiting", name);
}
