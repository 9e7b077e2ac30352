//! Station Configuration
//!
//! ## Overview
//!
//! A station is described by one file, INI or JSON, loaded into
//! [`StationConfig`]. INI is the native format:
//!
//! ```ini
//! [general]
//! name = greenhouse
//!
//! [format]
//! datetime = %H:%M:%S
//! decimals = 1
//!
//! ; temperature, evenly spread over the day (00:00, 06:00, 12:00, 18:00)
//! [profile]
//! jal00 = 12
//! jal01 = 16
//! jal02 = 24
//! jal03 = 18
//! noise = 0.3
//!
//! ; humidity as a fraction, explicitly anchored
//! [humidity]
//! jal00 = 0.70 @ 05:00
//! jal01 = 0.40 @ 14:30
//!
//! [timing]
//! sample_ms = 100
//! average_ms = 2000
//!
//! [storage]
//! path = greenhouse.db
//! ```
//!
//! Files ending in `.json` are read with serde into the same structure.
//!
//! ## Milestones
//!
//! Milestone keys are ordered by the number they end with (`jal2` before
//! `jal10`). A section is either fully implicit (plain values, spread evenly
//! from midnight) or fully explicit (`value @ HH:MM[:SS]`); mixing is
//! rejected because the two anchoring rules disagree on where a plain value
//! belongs.

use std::path::{Path, PathBuf};

use chrono::{
    format::{Item, StrftimeItems},
    NaiveTime,
};
use serde::{Deserialize, Serialize};
use thermoguard_core::{
    constants::{DEFAULT_AVERAGE_INTERVAL_MS, DEFAULT_SAMPLE_INTERVAL_MS},
    DriverConfig, Milestone, Profile, Quantity, QuantitySettings, Station, StationBuilder,
};

use crate::{
    ini::{IniDocument, IniSection},
    ConnectorError, ConnectorResult,
};

/// Default timestamp rendering
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default number of decimal places on the console
pub const DEFAULT_DECIMALS: usize = 2;

/// Upper bound on configurable decimal places
pub const MAX_DECIMALS: usize = 9;

const TEMPERATURE_SECTION: &str = "profile";
const HUMIDITY_SECTION: &str = "humidity";

/// Complete description of one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station name, prefix of every source id
    pub name: String,

    #[serde(default)]
    pub display: DisplayConfig,

    /// Temperature profile (`[profile]` in INI)
    #[serde(default)]
    pub temperature: Option<ProfileConfig>,

    /// Humidity profile, as fractions of saturation
    #[serde(default)]
    pub humidity: Option<ProfileConfig>,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// How the console renders values and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// chrono strftime pattern
    pub datetime: String,
    /// Decimal places for values
    pub decimals: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            datetime: DEFAULT_DATETIME_FORMAT.to_owned(),
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// One milestone as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MilestoneConfig {
    /// Value anchored by position
    Value(f64),
    /// Value anchored at an explicit `HH:MM[:SS]`
    Anchored { value: f64, at: String },
}

/// Milestones plus optional overrides of the quantity defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub milestones: Vec<MilestoneConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_threshold: Option<f64>,
}

impl ProfileConfig {
    /// Resolve milestones into a core profile
    pub fn to_profile(&self) -> ConnectorResult<Profile> {
        let explicit = self
            .milestones
            .iter()
            .filter(|m| matches!(m, MilestoneConfig::Anchored { .. }))
            .count();

        if explicit == 0 {
            let values = self
                .milestones
                .iter()
                .filter_map(|m| match m {
                    MilestoneConfig::Value(v) => Some(*v),
                    MilestoneConfig::Anchored { .. } => None,
                })
                .collect();
            return Ok(Profile::evenly_spaced(values)?);
        }

        if explicit != self.milestones.len() {
            return Err(ConnectorError::invalid(
                "milestones",
                "either every milestone has an '@ HH:MM' anchor or none does",
            ));
        }

        let milestones = self
            .milestones
            .iter()
            .filter_map(|m| match m {
                MilestoneConfig::Anchored { value, at } => Some((*value, at)),
                MilestoneConfig::Value(_) => None,
            })
            .map(|(value, at)| parse_time_of_day(at).map(|time| Milestone::new(time, value)))
            .collect::<ConnectorResult<Vec<_>>>()?;

        Ok(Profile::new(milestones)?)
    }

    /// Quantity defaults with this profile's overrides applied
    pub fn settings(&self, quantity: Quantity) -> QuantitySettings {
        let mut settings = quantity.default_settings();
        if let Some(noise) = self.noise {
            settings.noise_magnitude = noise;
        }
        if let Some(step) = self.step {
            settings.offset_step = step;
        }
        if let Some(relative) = self.relative_threshold {
            settings.thresholds.relative = relative;
        }
        if let Some(absolute) = self.absolute_threshold {
            settings.thresholds.absolute = absolute;
        }
        settings
    }
}

/// Driver periods in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub sample_ms: u64,
    pub average_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            average_ms: DEFAULT_AVERAGE_INTERVAL_MS,
        }
    }
}

impl TimingConfig {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::from_millis(self.sample_ms, self.average_ms)
    }
}

/// Where averages and alerts are persisted
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file; `None` disables persistence
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StationConfig {
    /// Load from a file, JSON if the extension says so, INI otherwise
    pub fn load(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_ini_str(&text)?
        };
        log::debug!("loaded station '{}' from {}", config.name, path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> ConnectorResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ini_str(text: &str) -> ConnectorResult<Self> {
        let doc = IniDocument::parse(text)?;

        let mut display = DisplayConfig::default();
        if let Some(datetime) = doc.get("format", "datetime") {
            display.datetime = datetime.to_owned();
        }
        if let Some(decimals) = doc.get("format", "decimals") {
            display.decimals = parse_number("[format] decimals", decimals)?;
        }

        let mut timing = TimingConfig::default();
        if let Some(ms) = doc.get("timing", "sample_ms") {
            timing.sample_ms = parse_number("[timing] sample_ms", ms)?;
        }
        if let Some(ms) = doc.get("timing", "average_ms") {
            timing.average_ms = parse_number("[timing] average_ms", ms)?;
        }

        let storage = StorageConfig {
            path: doc
                .get("storage", "path")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        };

        let temperature = doc
            .section(TEMPERATURE_SECTION)
            .map(|s| profile_from_section(TEMPERATURE_SECTION, s))
            .transpose()?;
        let humidity = doc
            .section(HUMIDITY_SECTION)
            .map(|s| profile_from_section(HUMIDITY_SECTION, s))
            .transpose()?;

        let config = Self {
            name: doc.require("general", "name")?.to_owned(),
            display,
            temperature,
            humidity,
            timing,
            storage,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check everything that can be checked without building the station
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConnectorError::invalid("name", "station name is empty"));
        }
        if self.name.contains('/') {
            return Err(ConnectorError::invalid("name", "station name cannot contain '/'"));
        }
        if StrftimeItems::new(&self.display.datetime).any(|item| matches!(item, Item::Error)) {
            return Err(ConnectorError::invalid(
                "datetime",
                format!("'{}' is not a valid strftime pattern", self.display.datetime),
            ));
        }
        if self.display.decimals > MAX_DECIMALS {
            return Err(ConnectorError::invalid(
                "decimals",
                format!("at most {MAX_DECIMALS} decimal places"),
            ));
        }
        self.timing.driver_config().validate()?;
        Ok(())
    }

    /// Builder for the configured station, ready for a clock and dispatcher
    pub fn station_builder(&self) -> ConnectorResult<StationBuilder> {
        let mut builder = Station::builder(self.name.clone());
        for (quantity, profile) in [
            (Quantity::Temperature, &self.temperature),
            (Quantity::Humidity, &self.humidity),
        ] {
            if let Some(profile) = profile {
                builder = builder.quantity_with(quantity, profile.to_profile()?, profile.settings(quantity));
            }
        }
        Ok(builder)
    }
}

fn profile_from_section(name: &str, section: &IniSection) -> ConnectorResult<ProfileConfig> {
    let mut config = ProfileConfig::default();
    let mut indexed: Vec<(u32, &str, MilestoneConfig)> = Vec::new();

    for (key, entry) in section.iter() {
        let qualified = format!("[{name}] {key}");
        match key {
            "noise" => config.noise = Some(parse_number(&qualified, &entry.value)?),
            "step" => config.step = Some(parse_number(&qualified, &entry.value)?),
            "relative_threshold" => {
                config.relative_threshold = Some(parse_number(&qualified, &entry.value)?)
            }
            "absolute_threshold" => {
                config.absolute_threshold = Some(parse_number(&qualified, &entry.value)?)
            }
            _ => {
                let index = milestone_index(key).ok_or_else(|| {
                    ConnectorError::invalid(qualified.clone(), "unknown key (expected jalNN)")
                })?;
                if let Some((_, other, _)) = indexed.iter().find(|(i, _, _)| *i == index) {
                    return Err(ConnectorError::invalid(
                        qualified,
                        format!("same milestone index as '{other}'"),
                    ));
                }
                indexed.push((index, key, parse_milestone(&qualified, &entry.value)?));
            }
        }
    }

    indexed.sort_by_key(|(index, _, _)| *index);
    config.milestones = indexed.into_iter().map(|(_, _, m)| m).collect();
    Ok(config)
}

/// Trailing digits of a key (`jal07` → 7)
fn milestone_index(key: &str) -> Option<u32> {
    let digits = key.trim_start_matches(|c: char| !c.is_ascii_digit());
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// `12.5` or `12.5 @ 06:30`
fn parse_milestone(key: &str, raw: &str) -> ConnectorResult<MilestoneConfig> {
    match raw.split_once('@') {
        Some((value, at)) => {
            let at = at.trim();
            parse_time_of_day(at).map_err(|_| {
                ConnectorError::invalid(key, format!("'{at}' is not a time of day (HH:MM[:SS])"))
            })?;
            Ok(MilestoneConfig::Anchored {
                value: parse_number(key, value.trim())?,
                at: at.to_owned(),
            })
        }
        None => Ok(MilestoneConfig::Value(parse_number(key, raw)?)),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> ConnectorResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ConnectorError::invalid(key, format!("'{raw}' is not a valid number")))
}

/// `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(raw: &str) -> ConnectorResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ConnectorError::invalid("at", format!("'{raw}' is not a time of day")))
}
