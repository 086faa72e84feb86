//! Sensor value objects
//!
//! Every sensor shares an immutable identity (name, type, location). The
//! type is fixed by the variant. Temperature readings are normalized to
//! Celsius on the way in; pressure and wind readings are kept verbatim.

use crate::parse::{parse_humidity, parse_temperature, ParseError};
use crate::units::{TemperatureUnit, UnitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Rejected sensor reading. The sensor is left as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(#[from] ParseError),

    #[error("{0}")]
    UnknownUnit(#[from] UnitError),

    #[error("Temperature unit must be declared before a numeric reading")]
    MissingUnit,

    #[error("Reading is not a finite number: {0}")]
    NonFinite(f64),
}

pub type SensorResult<T> = Result<T, SensorError>;

/// Device kind of a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Pressure,
    Wind,
}

impl SensorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Pressure => "pressure",
            SensorKind::Wind => "wind",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and location of a physical device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SensorIdentity {
    name: String,
    location: String,
}

impl SensorIdentity {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Temperature and relative humidity sensor
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSensor {
    identity: SensorIdentity,
    temperature: Option<f64>,
    temperature_uom: Option<TemperatureUnit>,
    relative_humidity: Option<f64>,
}

impl TemperatureSensor {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            identity: SensorIdentity::new(name, location),
            temperature: None,
            temperature_uom: None,
            relative_humidity: None,
        }
    }

    pub fn identity(&self) -> &SensorIdentity {
        &self.identity
    }

    /// Set the temperature from a reading like `"98.6F"`, storing it in Celsius
    pub fn set_temperature(&mut self, raw: &str) -> SensorResult<()> {
        let measurement = parse_temperature(raw)?;
        let celsius = measurement.to_celsius();
        debug!(
            sensor = %self.identity.name,
            raw,
            unit = %measurement.unit,
            celsius,
            "normalized temperature"
        );
        self.store_celsius(celsius)
    }

    /// Declare the unit of the next numeric temperature reading
    pub fn set_temperature_uom(&mut self, unit: &str) -> SensorResult<()> {
        self.temperature_uom = Some(unit.parse()?);
        Ok(())
    }

    /// Set the temperature from a number in the declared unit.
    ///
    /// Fails with [`SensorError::MissingUnit`] when no unit has been declared
    /// or set by an earlier reading. Once a reading is stored the unit is
    /// Celsius, so later numbers are taken as Celsius unless redeclared.
    pub fn set_temperature_value(&mut self, value: f64) -> SensorResult<()> {
        let unit = self.temperature_uom.ok_or(SensorError::MissingUnit)?;
        if !value.is_finite() {
            return Err(SensorError::NonFinite(value));
        }
        let celsius = unit.to_celsius(value);
        debug!(
            sensor = %self.identity.name,
            value,
            unit = %unit,
            celsius,
            "normalized temperature"
        );
        self.store_celsius(celsius)
    }

    fn store_celsius(&mut self, celsius: f64) -> SensorResult<()> {
        if !celsius.is_finite() {
            return Err(SensorError::NonFinite(celsius));
        }
        self.temperature = Some(celsius);
        self.temperature_uom = Some(TemperatureUnit::Celsius);
        Ok(())
    }

    /// Set relative humidity from a reading like `"45%"`
    pub fn set_relative_humidity(&mut self, raw: &str) -> SensorResult<()> {
        self.relative_humidity = Some(parse_humidity(raw)?);
        Ok(())
    }

    /// Set relative humidity from a percentage
    pub fn set_relative_humidity_value(&mut self, percent: f64) {
        self.relative_humidity = Some(percent);
    }

    /// Temperature in Celsius, if a reading has been stored
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// Unit tag of the temperature field (`"c"` once a reading is stored)
    pub fn temperature_uom(&self) -> Option<&'static str> {
        self.temperature_uom.map(TemperatureUnit::symbol)
    }

    pub fn relative_humidity(&self) -> Option<f64> {
        self.relative_humidity
    }
}

/// Barometric pressure sensor. Values are stored as reported.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureSensor {
    identity: SensorIdentity,
    pressure: f64,
    unit_of_measure: Option<String>,
}

// TODO: normalize pressure to a single unit once the storage side agrees on one
impl PressureSensor {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            identity: SensorIdentity::new(name, location),
            pressure: 0.0,
            unit_of_measure: None,
        }
    }

    pub fn identity(&self) -> &SensorIdentity {
        &self.identity
    }

    pub fn set_pressure(&mut self, pressure: f64) {
        self.pressure = pressure;
    }

    pub fn set_unit_of_measure(&mut self, unit: impl Into<String>) {
        self.unit_of_measure = Some(unit.into());
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn unit_of_measure(&self) -> Option<&str> {
        self.unit_of_measure.as_deref()
    }

    pub fn reading(&self) -> (f64, Option<&str>) {
        (self.pressure, self.unit_of_measure())
    }
}

/// Wind speed sensor. Values are stored as reported.
#[derive(Debug, Clone, PartialEq)]
pub struct WindSensor {
    identity: SensorIdentity,
    speed: Option<f64>,
    unit_of_measure: Option<String>,
}

impl WindSensor {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            identity: SensorIdentity::new(name, location),
            speed: None,
            unit_of_measure: None,
        }
    }

    pub fn identity(&self) -> &SensorIdentity {
        &self.identity
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = Some(speed);
    }

    pub fn set_unit_of_measure(&mut self, unit: impl Into<String>) {
        self.unit_of_measure = Some(unit.into());
    }

    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn unit_of_measure(&self) -> Option<&str> {
        self.unit_of_measure.as_deref()
    }

    pub fn reading(&self) -> (Option<f64>, Option<&str>) {
        (self.speed, self.unit_of_measure())
    }
}

/// Any station sensor
#[derive(Debug, Clone, PartialEq)]
pub enum Sensor {
    Temperature(TemperatureSensor),
    Pressure(PressureSensor),
    Wind(WindSensor),
}

impl Sensor {
    pub fn identity(&self) -> &SensorIdentity {
        match self {
            Sensor::Temperature(s) => s.identity(),
            Sensor::Pressure(s) => s.identity(),
            Sensor::Wind(s) => s.identity(),
        }
    }

    pub fn name(&self) -> &str {
        self.identity().name()
    }

    pub fn location(&self) -> &str {
        self.identity().location()
    }

    pub fn kind(&self) -> SensorKind {
        match self {
            Sensor::Temperature(_) => SensorKind::Temperature,
            Sensor::Pressure(_) => SensorKind::Pressure,
            Sensor::Wind(_) => SensorKind::Wind,
        }
    }

    /// Type string of the sensor (`"temperature"`, `"pressure"` or `"wind"`)
    pub fn sensor_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

impl From<TemperatureSensor> for Sensor {
    fn from(sensor: TemperatureSensor) -> Self {
        Sensor::Temperature(sensor)
    }
}

impl From<PressureSensor> for Sensor {
    fn from(sensor: PressureSensor) -> Self {
        Sensor::Pressure(sensor)
    }
}

impl From<WindSensor> for Sensor {
    fn from(sensor: WindSensor) -> Self {
        Sensor::Wind(sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_reading_is_stored_unchanged() {
        for (raw, expected) in [("-10C", -10.0), ("21.5c", 21.5), ("0 C", 0.0)] {
            let mut sensor = TemperatureSensor::new("porch", "north wall");
            sensor.set_temperature(raw).unwrap();
            assert_eq!(sensor.temperature(), Some(expected));
            assert_eq!(sensor.temperature_uom(), Some("c"));
        }
    }

    #[test]
    fn test_fahrenheit_reading_is_normalized() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        sensor.set_temperature("98.6F").unwrap();
        assert!((sensor.temperature().unwrap() - 37.0).abs() < 0.05);
        assert_eq!(sensor.temperature_uom(), Some("c"));

        sensor.set_temperature("32 f").unwrap();
        assert!(sensor.temperature().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_malformed_temperature_keeps_prior_state() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        sensor.set_temperature("20C").unwrap();

        let err = sensor.set_temperature("abc").unwrap_err();
        assert!(matches!(err, SensorError::InvalidMeasurement(_)));
        assert_eq!(sensor.temperature(), Some(20.0));

        assert!(sensor.set_temperature("72Fx").is_err());
        assert_eq!(sensor.temperature(), Some(20.0));
    }

    #[test]
    fn test_unset_temperature() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        assert_eq!(sensor.temperature(), None);
        assert_eq!(sensor.temperature_uom(), None);

        assert!(sensor.set_temperature("nope").is_err());
        assert_eq!(sensor.temperature(), None);
        assert_eq!(sensor.temperature_uom(), None);
    }

    #[test]
    fn test_numeric_temperature_requires_unit() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        assert_eq!(
            sensor.set_temperature_value(70.0),
            Err(SensorError::MissingUnit)
        );
        assert_eq!(sensor.temperature(), None);
    }

    #[test]
    fn test_numeric_temperature_uses_declared_unit() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        sensor.set_temperature_uom("F").unwrap();
        sensor.set_temperature_value(212.0).unwrap();
        assert!((sensor.temperature().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(sensor.temperature_uom(), Some("c"));

        // Unit is Celsius after normalization
        sensor.set_temperature_value(15.0).unwrap();
        assert_eq!(sensor.temperature(), Some(15.0));
    }

    #[test]
    fn test_non_finite_temperatures_keep_prior_state() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        sensor.set_temperature("20C").unwrap();

        let overflow = format!("{}C", "9".repeat(400));
        assert!(matches!(
            sensor.set_temperature(&overflow),
            Err(SensorError::InvalidMeasurement(_))
        ));
        assert_eq!(sensor.temperature(), Some(20.0));

        // Finite input whose conversion overflows
        sensor.set_temperature_uom("f").unwrap();
        assert!(matches!(
            sensor.set_temperature_value(f64::MAX),
            Err(SensorError::NonFinite(_))
        ));
        assert!(matches!(
            sensor.set_temperature_value(f64::INFINITY),
            Err(SensorError::NonFinite(_))
        ));
        assert!(matches!(
            sensor.set_temperature_value(f64::NAN),
            Err(SensorError::NonFinite(_))
        ));
        assert_eq!(sensor.temperature(), Some(20.0));
    }

    #[test]
    fn test_unknown_unit_declaration_is_rejected() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        let err = sensor.set_temperature_uom("kelvin").unwrap_err();
        assert!(matches!(err, SensorError::UnknownUnit(_)));
        assert_eq!(sensor.temperature_uom(), None);
    }

    #[test]
    fn test_relative_humidity() {
        let mut sensor = TemperatureSensor::new("porch", "north wall");
        sensor.set_relative_humidity("45%").unwrap();
        assert_eq!(sensor.relative_humidity(), Some(45.0));

        let err = sensor.set_relative_humidity("45").unwrap_err();
        assert!(matches!(err, SensorError::InvalidMeasurement(_)));
        assert_eq!(sensor.relative_humidity(), Some(45.0));

        sensor.set_relative_humidity_value(51.5);
        assert_eq!(sensor.relative_humidity(), Some(51.5));
    }

    #[test]
    fn test_pressure_and_wind_are_verbatim() {
        let mut pressure = PressureSensor::new("baro", "shed");
        assert_eq!(pressure.reading(), (0.0, None));
        pressure.set_pressure(1.0132);
        pressure.set_unit_of_measure("bar");
        assert_eq!(pressure.reading(), (1.0132, Some("bar")));

        let mut wind = WindSensor::new("anemometer", "roof");
        assert_eq!(wind.reading(), (None, None));
        wind.set_speed(12.0);
        wind.set_unit_of_measure("knots");
        assert_eq!(wind.reading(), (Some(12.0), Some("knots")));
    }

    #[test]
    fn test_sensor_dispatch() {
        let sensors: Vec<Sensor> = vec![
            TemperatureSensor::new("porch", "north wall").into(),
            PressureSensor::new("baro", "shed").into(),
            WindSensor::new("anemometer", "roof").into(),
        ];
        let types: Vec<_> = sensors.iter().map(Sensor::sensor_type).collect();
        assert_eq!(types, ["temperature", "pressure", "wind"]);
        assert_eq!(sensors[2].name(), "anemometer");
        assert_eq!(sensors[2].location(), "roof");
        assert_eq!(sensors[0].kind(), SensorKind::Temperature);
    }

    #[test]
    fn test_sensor_kind_serde() {
        assert_eq!(
            serde_json::to_string(&SensorKind::Pressure).unwrap(),
            r#""pressure""#
        );
        let kind: SensorKind = serde_json::from_str(r#""wind""#).unwrap();
        assert_eq!(kind, SensorKind::Wind);
    }
}
