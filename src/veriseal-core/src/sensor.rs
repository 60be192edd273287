//! Sensor line parsing and synthetic probe measurements.
//!
//! The firmware reports readings over the wire as lines shaped
//! `H=61.5%, T=30.2C`. Interactive probe commands (`CMD:TEMP` and
//! friends) produce synthetic single-metric measurements for exercising
//! the pipeline without hardware attached.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde_json::{Map, Value};
use veriseal_hash::{finite_number, EncodingError};

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"H=(?P<humidity>[0-9]+(?:\.[0-9]+)?)%,\s*T=(?P<temp>[0-9]+(?:\.[0-9]+)?)C")
        .expect("sensor line regex is valid")
});

static COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^CMD:(?P<cmd>TEMP|MOISTURE|SALINITY|PH)$")
        .expect("probe command regex is valid")
});

/// A parsed temperature/humidity reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
}

impl SensorReading {
    /// Render the reading as a payload sensor section, validating that
    /// both values have a canonical rendering.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::NonFiniteNumber`] for NaN or infinite
    /// readings; they must never reach the canonicalizer.
    pub fn to_section(&self) -> Result<Map<String, Value>, EncodingError> {
        let mut section = Map::new();
        section.insert(
            "temperature".into(),
            Value::Number(finite_number(self.temperature, "sensor.temperature")?),
        );
        section.insert(
            "humidity".into(),
            Value::Number(finite_number(self.humidity, "sensor.humidity")?),
        );
        Ok(section)
    }
}

/// Parse a firmware sensor line. Returns `None` for unrelated lines.
#[must_use]
pub fn parse_sensor_line(line: &str) -> Option<SensorReading> {
    let captures = LINE_PATTERN.captures(line)?;
    // The pattern only admits digit runs, so these parses cannot fail.
    let humidity: f64 = captures.name("humidity")?.as_str().parse().ok()?;
    let temperature: f64 = captures.name("temp")?.as_str().parse().ok()?;
    Some(SensorReading {
        temperature,
        humidity,
    })
}

/// A probe command requesting one synthetic measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeCommand {
    /// Synthetic temperature reading.
    Temperature,
    /// Synthetic soil moisture reading.
    Moisture,
    /// Synthetic salinity reading.
    Salinity,
    /// Synthetic pH reading.
    Ph,
}

impl ProbeCommand {
    /// Parse a `CMD:<name>` line, case-insensitively. Returns `None` for
    /// anything else.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let captures = COMMAND_PATTERN.captures(line.trim())?;
        match captures.name("cmd")?.as_str().to_ascii_uppercase().as_str() {
            "TEMP" => Some(Self::Temperature),
            "MOISTURE" => Some(Self::Moisture),
            "SALINITY" => Some(Self::Salinity),
            "PH" => Some(Self::Ph),
            _ => None,
        }
    }

    /// The `source` tag recorded for measurements born from this command.
    #[must_use]
    pub fn source_tag(&self) -> &'static str {
        match self {
            Self::Temperature => "dummy-temp",
            Self::Moisture => "dummy-moisture",
            Self::Salinity => "dummy-salinity",
            Self::Ph => "dummy-ph",
        }
    }

    /// Metric key and plausible value range for the synthetic reading.
    fn metric(&self) -> (&'static str, std::ops::Range<f64>) {
        match self {
            Self::Temperature => ("temperature", 20.0..36.0),
            Self::Moisture => ("moisture", 15.0..85.0),
            Self::Salinity => ("salinity", 0.1..4.0),
            Self::Ph => ("ph", 5.5..8.5),
        }
    }

    /// Produce a synthetic single-metric sensor section.
    #[must_use]
    pub fn synthesize(&self) -> Map<String, Value> {
        let (key, range) = self.metric();
        let value = round2(rand::thread_rng().gen_range(range));

        let mut section = Map::new();
        // Synthesized values are finite by construction.
        if let Ok(number) = finite_number(value, key) {
            section.insert(key.to_string(), Value::Number(number));
        }
        section
    }
}

/// Round to two decimals, matching the firmware's reporting precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
