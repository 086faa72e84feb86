//! Unit conversion utilities
//!
//! Temperatures are stored in Celsius. Pressure and wind units are kept as
//! reported until a canonical unit is chosen for them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit conversion error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown temperature unit: {0:?}")]
    UnknownUnit(String),
}

/// Nominal pressure unit, used when a sensor does not report one
pub const DEFAULT_PRESSURE_UOM: &str = "bar";

/// Nominal wind speed unit, used when a sensor does not report one
pub const DEFAULT_WIND_UOM: &str = "miles per hour";

/// Unit reported for relative humidity
pub const HUMIDITY_UOM: &str = "%";

/// Temperature scale of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "c")]
    Celsius,
    #[serde(rename = "f")]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Short lowercase tag (`"c"` or `"f"`)
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "c",
            TemperatureUnit::Fahrenheit => "f",
        }
    }

    /// Convert a value expressed in this unit to Celsius
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => fahrenheit_to_celsius(value),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" | "°c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "°f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(UnitError::UnknownUnit(s.to_string())),
        }
    }
}

/// Convert Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    (value - 32.0) * 5.0 / 9.0
}

/// Convert Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(value: f64) -> f64 {
    value * 9.0 / 5.0 + 32.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_conversion() {
        // F to C: 32F = 0C
        assert!((fahrenheit_to_celsius(32.0) - 0.0).abs() < 0.001);

        // C to F: 0C = 32F
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 0.001);

        // F to C: 212F = 100C
        assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 0.001);

        // -40 is the same on both scales
        assert!((fahrenheit_to_celsius(-40.0) + 40.0).abs() < 0.001);
    }

    #[test]
    fn test_round_trip() {
        for x in [-273.15, -40.0, -10.5, 0.0, 0.1, 21.7, 37.0, 100.0, 1.0e6] {
            let back = fahrenheit_to_celsius(celsius_to_fahrenheit(x));
            assert!((back - x).abs() < 1e-9 * x.abs().max(1.0), "{x} -> {back}");
        }
    }

    #[test]
    fn test_to_celsius() {
        assert_eq!(TemperatureUnit::Celsius.to_celsius(25.0), 25.0);
        assert!((TemperatureUnit::Fahrenheit.to_celsius(98.6) - 37.0).abs() < 0.001);
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("c".parse(), Ok(TemperatureUnit::Celsius));
        assert_eq!(" Celsius ".parse(), Ok(TemperatureUnit::Celsius));
        assert_eq!("°F".parse(), Ok(TemperatureUnit::Fahrenheit));
        assert_eq!("fahrenheit".parse(), Ok(TemperatureUnit::Fahrenheit));
        assert_eq!(
            "kelvin".parse::<TemperatureUnit>(),
            Err(UnitError::UnknownUnit("kelvin".to_string()))
        );
    }
}
