//! Core data types, unit normalization, and measurement parsing for the
//! cereal weather station.
//!
//! Raw sensor payloads are parsed and normalized into sensor value objects,
//! which are then flattened into [`WeatherMetric`] records for storage.

pub mod metric;
pub mod parse;
pub mod payload;
pub mod pipeline;
pub mod sensor;
pub mod units;

pub use metric::*;
pub use parse::*;
pub use payload::*;
pub use pipeline::*;
pub use sensor::*;
pub use units::*;
