//! Persisted metric records
//!
//! A [`WeatherMetric`] is one normalized observation of one sensor. Older
//! producers used a different record layout; [`LegacyWeatherMetric`] maps
//! those onto the canonical shape.

use crate::sensor::Sensor;
use crate::units::{DEFAULT_PRESSURE_UOM, DEFAULT_WIND_UOM, HUMIDITY_UOM};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric names produced from sensors
pub mod metric_names {
    pub const TEMPERATURE: &str = "temperature";
    pub const RELATIVE_HUMIDITY: &str = "relativeHumidity";
    pub const PRESSURE: &str = "pressure";
    pub const WIND_SPEED: &str = "speed";
}

/// A single normalized observation, ready for storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherMetric {
    /// Surrogate key, assigned by storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Name of the sensor that produced the observation
    pub sensor: String,

    #[serde(alias = "metricName")]
    pub name: String,

    pub value: f64,

    pub unit_of_measure: String,

    pub date_time: DateTime<FixedOffset>,
}

impl WeatherMetric {
    pub fn new(
        sensor: impl Into<String>,
        name: impl Into<String>,
        value: f64,
        unit_of_measure: impl Into<String>,
        date_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: None,
            sensor: sensor.into(),
            name: name.into(),
            value,
            unit_of_measure: unit_of_measure.into(),
            date_time,
        }
    }

    /// Flatten a sensor's current readings into metric records.
    ///
    /// Unset temperature, humidity and wind readings produce no record.
    /// Pressure and wind fall back to their nominal unit when none was
    /// reported.
    pub fn from_sensor(sensor: &Sensor, at: DateTime<FixedOffset>) -> Vec<Self> {
        let name = sensor.name();
        let mut metrics = Vec::new();

        match sensor {
            Sensor::Temperature(s) => {
                if let (Some(value), Some(unit)) = (s.temperature(), s.temperature_uom()) {
                    metrics.push(Self::new(name, metric_names::TEMPERATURE, value, unit, at));
                }
                if let Some(value) = s.relative_humidity() {
                    metrics.push(Self::new(
                        name,
                        metric_names::RELATIVE_HUMIDITY,
                        value,
                        HUMIDITY_UOM,
                        at,
                    ));
                }
            }
            Sensor::Pressure(s) => {
                let (value, unit) = s.reading();
                metrics.push(Self::new(
                    name,
                    metric_names::PRESSURE,
                    value,
                    unit.unwrap_or(DEFAULT_PRESSURE_UOM),
                    at,
                ));
            }
            Sensor::Wind(s) => {
                if let (Some(value), unit) = s.reading() {
                    metrics.push(Self::new(
                        name,
                        metric_names::WIND_SPEED,
                        value,
                        unit.unwrap_or(DEFAULT_WIND_UOM),
                        at,
                    ));
                }
            }
        }

        metrics
    }

    /// Value to two decimals followed by the unit, e.g. `"72.50 F"`
    pub fn pretty_value(&self) -> String {
        format!("{:.2} {}", self.value, self.unit_of_measure)
    }
}

impl fmt::Display for WeatherMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}={}", self.sensor, self.name, self.pretty_value())
    }
}

/// Record layout used by older producers (`weatherMetrics` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyWeatherMetric {
    #[serde(default)]
    pub id: Option<i64>,

    pub sensor_id: String,

    pub metric_name: String,

    /// Sensor type of the producing device; implied by the sensor reference
    /// in the canonical shape
    #[serde(default)]
    pub metric_type: Option<String>,

    pub value: f32,

    pub unit_of_measure: String,

    pub date_time: DateTime<FixedOffset>,
}

impl From<LegacyWeatherMetric> for WeatherMetric {
    fn from(legacy: LegacyWeatherMetric) -> Self {
        Self {
            id: legacy.id,
            sensor: legacy.sensor_id,
            name: legacy.metric_name,
            value: f64::from(legacy.value),
            unit_of_measure: legacy.unit_of_measure,
            date_time: legacy.date_time,
        }
    }
}
