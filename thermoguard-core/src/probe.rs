//! Simulated Probes
//!
//! A probe turns a profile into noisy readings:
//!
//! ```text
//! value = profile.expected_value(now) + noise + offset
//! ```
//!
//! - **noise** is drawn from a [`NoiseSource`], uniformly in `[-ε, +ε]` for
//!   the production [`UniformNoise`].
//! - **offset** is the operator-controlled drift. It is shared through a
//!   [`DriftOffset`] handle so the command loop can nudge it while a driver
//!   samples; a change is visible on the next sample. It is never clamped
//!   and never reset.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{events::Reading, profile::Profile, quantity::Quantity, time::Timestamp};

/// Random reading error generator
pub trait NoiseSource: Send {
    /// Next error value
    fn next_error(&mut self) -> f64;
}

/// Uniform error in `[-magnitude, +magnitude]`
#[derive(Debug, Clone)]
pub struct UniformNoise {
    magnitude: f64,
    rng: StdRng,
}

impl UniformNoise {
    pub fn new(magnitude: f64) -> Self {
        Self {
            magnitude: magnitude.abs(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for tests and replays
    pub fn seeded(magnitude: f64, seed: u64) -> Self {
        Self {
            magnitude: magnitude.abs(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for UniformNoise {
    fn next_error(&mut self) -> f64 {
        if self.magnitude == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.magnitude..=self.magnitude)
    }
}

/// No error at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn next_error(&mut self) -> f64 {
        0.0
    }
}

/// Shared, lock-free drift offset
///
/// Stores the `f64` bit pattern in an atomic; clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct DriftOffset {
    bits: Arc<AtomicU64>,
}

impl DriftOffset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Add `delta` atomically and return the new offset
    pub fn adjust(&self, delta: f64) -> f64 {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return f64::from_bits(next),
                Err(actual) => current = actual,
            }
        }
    }
}

/// Simulated probe for one source
pub struct Probe {
    source_id: String,
    quantity: Quantity,
    profile: Arc<Profile>,
    noise: Box<dyn NoiseSource>,
    offset: DriftOffset,
    step: f64,
}

impl Probe {
    pub fn new(
        source_id: impl Into<String>,
        quantity: Quantity,
        profile: Arc<Profile>,
        noise: Box<dyn NoiseSource>,
        step: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            quantity,
            profile,
            noise,
            offset: DriftOffset::new(),
            step: step.abs(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    /// Handle sharing this probe's offset
    pub fn offset_handle(&self) -> DriftOffset {
        self.offset.clone()
    }

    pub fn offset(&self) -> f64 {
        self.offset.get()
    }

    /// Raise the offset by one step
    pub fn increase(&self) -> f64 {
        self.offset.adjust(self.step)
    }

    /// Lower the offset by one step
    pub fn decrease(&self) -> f64 {
        self.offset.adjust(-self.step)
    }

    /// Take one noisy reading at `now`
    pub fn sample(&mut self, now: Timestamp) -> Reading {
        let expected = self.profile.expected_value(now.time());
        let error = self.noise.next_error();
        Reading {
            source_id: self.source_id.clone(),
            quantity: self.quantity,
            value: expected + error + self.offset.get(),
            timestamp: now,
        }
    }
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("source_id", &self.source_id)
            .field("quantity", &self.quantity)
            .field("offset", &self.offset.get())
            .field("step", &self.step)
            .finish()
    }
}
