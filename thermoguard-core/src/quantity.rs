//! Monitored Quantities and Their Per-Quantity Settings
//!
//! A station tracks two quantities, temperature and humidity. They share the
//! same pipeline; what differs is carried by [`QuantitySettings`]:
//!
//! | Quantity    | Unit | Noise  | Step | Relative | Absolute |
//! |-------------|------|--------|------|----------|----------|
//! | Temperature | °C   | ±0.5   | 0.5  | 10%      | 10.0     |
//! | Humidity    | frac | ±0.05  | 0.04 | 10%      | 0.1      |
//!
//! Humidity is carried as a fraction of saturation; display adapters scale
//! it to a percentage.

use serde::{Deserialize, Serialize};

use crate::{
    alert::AlertThresholds,
    constants::{
        HUMIDITY_ALERT_ABSOLUTE_FRACTION, HUMIDITY_ALERT_RELATIVE, HUMIDITY_NOISE_FRACTION,
        HUMIDITY_OFFSET_STEP_FRACTION, TEMP_ALERT_ABSOLUTE_C, TEMP_ALERT_RELATIVE, TEMP_NOISE_C,
        TEMP_OFFSET_STEP_C,
    },
    errors::{MonitorError, MonitorResult},
};

/// Quantity measured by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Temperature,
    Humidity,
}

impl Quantity {
    /// Every quantity a station monitors, in channel order
    pub const ALL: [Quantity; 2] = [Quantity::Temperature, Quantity::Humidity];

    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
        }
    }

    /// Unit of the values carried in events
    pub const fn unit(&self) -> &'static str {
        match self {
            Quantity::Temperature => "°C",
            Quantity::Humidity => "",
        }
    }

    /// Default noise, step and thresholds for this quantity
    pub const fn default_settings(&self) -> QuantitySettings {
        match self {
            Quantity::Temperature => QuantitySettings {
                noise_magnitude: TEMP_NOISE_C,
                offset_step: TEMP_OFFSET_STEP_C,
                thresholds: AlertThresholds {
                    relative: TEMP_ALERT_RELATIVE,
                    absolute: TEMP_ALERT_ABSOLUTE_C,
                },
            },
            Quantity::Humidity => QuantitySettings {
                noise_magnitude: HUMIDITY_NOISE_FRACTION,
                offset_step: HUMIDITY_OFFSET_STEP_FRACTION,
                thresholds: AlertThresholds {
                    relative: HUMIDITY_ALERT_RELATIVE,
                    absolute: HUMIDITY_ALERT_ABSOLUTE_FRACTION,
                },
            },
        }
    }
}

/// Tunables for one quantity's probe and alert evaluator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantitySettings {
    /// Half-width of the uniform reading error
    pub noise_magnitude: f64,

    /// Offset change per raise/mitigate command
    pub offset_step: f64,

    /// Deviation thresholds for alerts
    pub thresholds: AlertThresholds,
}

impl QuantitySettings {
    /// Reject settings the probe or evaluator cannot work with
    pub fn validate(&self) -> MonitorResult<()> {
        if !self.noise_magnitude.is_finite() || self.noise_magnitude < 0.0 {
            return Err(MonitorError::InvalidSettings {
                reason: "noise magnitude must be finite and non-negative",
            });
        }
        if !self.offset_step.is_finite() || self.offset_step <= 0.0 {
            return Err(MonitorError::InvalidSettings {
                reason: "offset step must be finite and positive",
            });
        }
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        for quantity in Quantity::ALL {
            assert!(quantity.default_settings().validate().is_ok());
        }
    }

    #[test]
    fn rejects_bad_step() {
        let mut settings = Quantity::Temperature.default_settings();
        settings.offset_step = 0.0;
        assert!(matches!(settings.validate(), Err(MonitorError::InvalidSettings { .. })));

        settings.offset_step = 0.5;
        settings.noise_magnitude = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn names() {
        assert_eq!(Quantity::Temperature.name(), "temperature");
        assert_eq!(Quantity::Humidity.name(), "humidity");
    }
}
