//! Line-oriented ingest of sensor readings
//!
//! Each input line is one JSON sensor reading. Readings are normalized,
//! flattened into metric records, and handed to every configured sink.

use anyhow::{Context, Result};
use cereal_config::AppConfig;
use cereal_core::{MetricSink, SensorError, SensorReading, WeatherMetric};
use cereal_sinks::FsSink;
use chrono::{DateTime, FixedOffset};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// Reason a single reading line was rejected
#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Sensor(#[from] SensorError),
}

/// Counts from one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Readings that produced a sensor
    pub accepted: usize,
    /// Lines that could not be parsed or normalized
    pub rejected: usize,
    /// Metric records emitted per sink
    pub metrics: usize,
}

/// Normalize one JSON reading into metric records.
/// Readings without a `dateTime` are stamped with `now`.
pub fn normalize_line(
    line: &str,
    now: DateTime<FixedOffset>,
) -> Result<Vec<WeatherMetric>, ReadingError> {
    let reading: SensorReading = serde_json::from_str(line)?;
    let at = reading.date_time.unwrap_or(now);
    let sensor = reading.payload.into_sensor()?;
    debug!(sensor = sensor.name(), kind = %sensor.kind(), "normalized reading");
    Ok(WeatherMetric::from_sensor(&sensor, at))
}

/// Read JSON lines from `reader` and emit the resulting metrics to `sinks`.
///
/// Blank lines are skipped. Rejected readings are logged and counted. A sink
/// failure stops the run after the reading has been offered to every sink,
/// so the error reports how many writes of that reading were stored.
pub async fn ingest_lines<R, F>(
    reader: R,
    sinks: &mut [Box<dyn MetricSink>],
    mut now: F,
) -> Result<IngestSummary>
where
    R: AsyncBufRead + Unpin,
    F: FnMut() -> DateTime<FixedOffset>,
{
    let mut lines = reader.lines();
    let mut summary = IngestSummary::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let metrics = match normalize_line(line, now()) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(line = line_no, error = %e, "rejected reading");
                summary.rejected += 1;
                continue;
            }
        };

        let mut first_error: Option<anyhow::Error> = None;
        let mut failed = 0usize;
        for metric in &metrics {
            for sink in sinks.iter_mut() {
                if let Err(e) = sink.emit(metric).await {
                    warn!(line = line_no, metric = %metric, error = %e, "sink write failed");
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_error {
            let attempted = metrics.len() * sinks.len();
            return Err(e.context(format!(
                "emitting metrics from line {line_no}: {failed} of {attempted} writes failed, {} stored",
                attempted - failed
            )));
        }
        summary.accepted += 1;
        summary.metrics += metrics.len();
    }

    Ok(summary)
}

/// Build the sinks named in the configuration. The JSON-lines sink is always present.
pub async fn build_sinks(cfg: &AppConfig) -> Result<Vec<Box<dyn MetricSink>>> {
    let mut sinks: Vec<Box<dyn MetricSink>> = Vec::new();

    let fs_dir = cfg.fs_dir();
    sinks.push(Box::new(
        FsSink::new(&fs_dir).with_context(|| format!("opening fs sink at {fs_dir}"))?,
    ));

    if let Some(path) = cfg.sqlite_path() {
        #[cfg(feature = "sqlite")]
        sinks.push(Box::new(cereal_sinks::sqlite::SqliteSink::new(&path)?));
        #[cfg(not(feature = "sqlite"))]
        warn!(%path, "sqlite sink configured but the sqlite feature is disabled");
    }

    #[cfg(feature = "postgres")]
    if let Some(url) = cfg.postgres_url() {
        sinks.push(Box::new(cereal_sinks::postgres::PostgresSink::new(&url).await?));
    }
    #[cfg(not(feature = "postgres"))]
    if cfg.postgres_url().is_some() {
        warn!("postgres sink configured but the postgres feature is disabled");
    }

    Ok(sinks)
}
