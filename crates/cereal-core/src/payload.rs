//! Incoming sensor reading payloads
//!
//! Payloads are JSON objects tagged by `type`. Temperature and humidity may
//! arrive either as strings carrying a unit (`"98.6F"`, `"45%"`) or as
//! plain numbers.

use crate::sensor::{PressureSensor, Sensor, SensorResult, TemperatureSensor, WindSensor};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A measurement field that is either a unit-bearing string or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

/// Raw sensor payload as supplied by the HTTP layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SensorPayload {
    Temperature {
        name: String,
        location: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<Reading>,
        #[serde(
            rename = "temperatureUoM",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        temperature_uom: Option<String>,
        #[serde(
            rename = "relativeHumidity",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        relative_humidity: Option<Reading>,
    },
    Pressure {
        name: String,
        location: String,
        #[serde(default)]
        pressure: f64,
        #[serde(
            rename = "unitOfMeasure",
            alias = "UoM",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        unit_of_measure: Option<String>,
    },
    Wind {
        name: String,
        location: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed: Option<f64>,
        #[serde(
            rename = "unitOfMeasure",
            alias = "UoM",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        unit_of_measure: Option<String>,
    },
}

impl SensorPayload {
    /// Build a normalized sensor from the payload.
    ///
    /// A declared temperature unit is applied before a numeric temperature,
    /// so field order in the payload does not matter. String temperatures
    /// carry their own unit and ignore the declaration.
    pub fn into_sensor(self) -> SensorResult<Sensor> {
        match self {
            SensorPayload::Temperature {
                name,
                location,
                temperature,
                temperature_uom,
                relative_humidity,
            } => {
                let mut sensor = TemperatureSensor::new(name, location);
                match temperature {
                    Some(Reading::Text(raw)) => sensor.set_temperature(&raw)?,
                    Some(Reading::Number(value)) => {
                        if let Some(unit) = temperature_uom.as_deref() {
                            sensor.set_temperature_uom(unit)?;
                        }
                        sensor.set_temperature_value(value)?;
                    }
                    None => {}
                }
                match relative_humidity {
                    Some(Reading::Text(raw)) => sensor.set_relative_humidity(&raw)?,
                    Some(Reading::Number(value)) => sensor.set_relative_humidity_value(value),
                    None => {}
                }
                Ok(sensor.into())
            }
            SensorPayload::Pressure {
                name,
                location,
                pressure,
                unit_of_measure,
            } => {
                let mut sensor = PressureSensor::new(name, location);
                sensor.set_pressure(pressure);
                if let Some(unit) = unit_of_measure {
                    sensor.set_unit_of_measure(unit);
                }
                Ok(sensor.into())
            }
            SensorPayload::Wind {
                name,
                location,
                speed,
                unit_of_measure,
            } => {
                let mut sensor = WindSensor::new(name, location);
                if let Some(speed) = speed {
                    sensor.set_speed(speed);
                }
                if let Some(unit) = unit_of_measure {
                    sensor.set_unit_of_measure(unit);
                }
                Ok(sensor.into())
            }
        }
    }
}

/// A payload together with the time it was observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(
        rename = "dateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_time: Option<DateTime<FixedOffset>>,

    #[serde(flatten)]
    pub payload: SensorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorError;

    fn parse(json: &str) -> SensorPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_temperature_string_payload() {
        let payload = parse(
            r#"{"type":"temperature","name":"porch","location":"north wall","temperature":"98.6F","relativeHumidity":"45%"}"#,
        );
        let Sensor::Temperature(sensor) = payload.into_sensor().unwrap() else {
            panic!("expected a temperature sensor");
        };
        assert!((sensor.temperature().unwrap() - 37.0).abs() < 0.05);
        assert_eq!(sensor.temperature_uom(), Some("c"));
        assert_eq!(sensor.relative_humidity(), Some(45.0));
    }

    #[test]
    fn test_numeric_temperature_field_order_does_not_matter() {
        let payload = parse(
            r#"{"temperature":212,"type":"temperature","name":"porch","location":"north wall","temperatureUoM":"F","relativeHumidity":40.5}"#,
        );
        let Sensor::Temperature(sensor) = payload.into_sensor().unwrap() else {
            panic!("expected a temperature sensor");
        };
        assert!((sensor.temperature().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(sensor.relative_humidity(), Some(40.5));
    }

    #[test]
    fn test_string_temperature_ignores_declared_unit() {
        let payload = parse(
            r#"{"type":"temperature","name":"porch","location":"north wall","temperature":"20C","temperatureUoM":"kelvin"}"#,
        );
        let Sensor::Temperature(sensor) = payload.into_sensor().unwrap() else {
            panic!("expected a temperature sensor");
        };
        assert_eq!(sensor.temperature(), Some(20.0));
        assert_eq!(sensor.temperature_uom(), Some("c"));

        let payload = parse(
            r#"{"type":"temperature","name":"porch","location":"north wall","temperature":"50F","temperatureUoM":"c"}"#,
        );
        let Sensor::Temperature(sensor) = payload.into_sensor().unwrap() else {
            panic!("expected a temperature sensor");
        };
        assert!((sensor.temperature().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_temperature_with_unknown_unit_is_rejected() {
        let payload = parse(
            r#"{"type":"temperature","name":"porch","location":"north wall","temperature":20,"temperatureUoM":"kelvin"}"#,
        );
        assert!(matches!(
            payload.into_sensor(),
            Err(SensorError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_numeric_temperature_without_unit_is_rejected() {
        let payload = parse(
            r#"{"type":"temperature","name":"porch","location":"north wall","temperature":20}"#,
        );
        assert_eq!(payload.into_sensor(), Err(SensorError::MissingUnit));
    }

    #[test]
    fn test_malformed_readings_are_rejected() {
        let payload = parse(
            r#"{"type":"temperature","name":"porch","location":"north wall","temperature":"abc"}"#,
        );
        assert!(matches!(
            payload.into_sensor(),
            Err(SensorError::InvalidMeasurement(_))
        ));

        let payload = parse(
            r#"{"type":"temperature","name":"porch","location":"north wall","relativeHumidity":"lots"}"#,
        );
        assert!(matches!(
            payload.into_sensor(),
            Err(SensorError::InvalidMeasurement(_))
        ));
    }

    #[test]
    fn test_pressure_and_wind_payloads() {
        let sensor = parse(
            r#"{"type":"pressure","name":"baro","location":"shed","pressure":1.013,"UoM":"bar"}"#,
        )
        .into_sensor()
        .unwrap();
        let Sensor::Pressure(pressure) = &sensor else {
            panic!("expected a pressure sensor");
        };
        assert_eq!(pressure.reading(), (1.013, Some("bar")));

        let sensor = parse(
            r#"{"type":"wind","name":"anemometer","location":"roof","speed":12,"unitOfMeasure":"miles per hour"}"#,
        )
        .into_sensor()
        .unwrap();
        assert_eq!(sensor.sensor_type(), "wind");
        let Sensor::Wind(wind) = &sensor else {
            panic!("expected a wind sensor");
        };
        assert_eq!(wind.reading(), (Some(12.0), Some("miles per hour")));
    }

    #[test]
    fn test_unknown_sensor_type() {
        let result = serde_json::from_str::<SensorPayload>(
            r#"{"type":"rain","name":"gauge","location":"yard"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sensor_reading_envelope() {
        let reading: SensorReading = serde_json::from_str(
            r#"{"dateTime":"2024-05-01T12:00:00+02:00","type":"wind","name":"anemometer","location":"roof","speed":3.5}"#,
        )
        .unwrap();
        assert_eq!(
            reading.date_time.unwrap().to_rfc3339(),
            "2024-05-01T12:00:00+02:00"
        );
        assert_eq!(reading.payload.into_sensor().unwrap().name(), "anemometer");

        let reading: SensorReading =
            serde_json::from_str(r#"{"type":"pressure","name":"baro","location":"shed"}"#)
                .unwrap();
        assert!(reading.date_time.is_none());
    }
}
