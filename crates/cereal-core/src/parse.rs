//! Measurement parsing for free-form sensor readings such as `"72.5F"` or `"45%"`
//!
//! A reading is an optionally signed decimal number, optional whitespace,
//! and a unit tag. The whole string must match; trailing text is rejected.

use crate::units::TemperatureUnit;
use std::fmt;

/// Kind of reading a parser expected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Temperature,
    Humidity,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Temperature => f.write_str("temperature"),
            Quantity::Humidity => f.write_str("relative humidity"),
        }
    }
}

/// Reading did not match the measurement grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {expected} reading: {input:?}")]
pub struct ParseError {
    pub input: String,
    pub expected: Quantity,
}

impl ParseError {
    fn new(input: &str, expected: Quantity) -> Self {
        Self {
            input: input.to_string(),
            expected,
        }
    }
}

/// A parsed temperature reading in its reported unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Measurement {
    pub fn to_celsius(self) -> f64 {
        self.unit.to_celsius(self.value)
    }
}

/// Parse a temperature reading like `"98.6F"`, `"-10 c"` or `"+3.5C"`
pub fn parse_temperature(s: &str) -> Result<Measurement, ParseError> {
    let err = || ParseError::new(s, Quantity::Temperature);
    let (number, unit) = split_reading(s).ok_or_else(err)?;
    let unit = match unit {
        "C" | "c" => TemperatureUnit::Celsius,
        "F" | "f" => TemperatureUnit::Fahrenheit,
        _ => return Err(err()),
    };
    let value = parse_number(number).ok_or_else(err)?;
    Ok(Measurement { value, unit })
}

/// Parse a relative humidity reading like `"45%"` into a percentage
pub fn parse_humidity(s: &str) -> Result<f64, ParseError> {
    let err = || ParseError::new(s, Quantity::Humidity);
    match split_reading(s) {
        Some((number, "%")) => parse_number(number).ok_or_else(err),
        _ => Err(err()),
    }
}

/// Digit strings long enough to overflow parse to infinity are rejected
fn parse_number(number: &str) -> Option<f64> {
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split a reading into its numeric part and the unit tag that follows any
/// whitespace. Returns `None` when the numeric part is malformed.
fn split_reading(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let digits = count_digits(&bytes[end..]);
    if digits == 0 {
        return None;
    }
    end += digits;

    if bytes.get(end) == Some(&b'.') {
        let fraction = count_digits(&bytes[end + 1..]);
        if fraction == 0 {
            return None;
        }
        end += 1 + fraction;
    }

    Some((&s[..end], s[end..].trim_start()))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
