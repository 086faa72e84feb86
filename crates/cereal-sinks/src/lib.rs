//! Storage adapters for normalized metric records

use anyhow::{Context, Result};
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use cereal_core::{MetricSink, WeatherMetric};
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends metrics as JSON lines to `<dir>/metrics.jsonl`
pub struct FsSink {
    file: PathBuf,
}

impl FsSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let file = dir.join("metrics.jsonl");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

#[async_trait::async_trait]
impl MetricSink for FsSink {
    async fn emit(&mut self, metric: &WeatherMetric) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        let line = serde_json::to_string(metric)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }
}

/// Keeps metrics in memory, assigning sequential ids
#[derive(Debug, Default)]
pub struct MemorySink {
    metrics: Vec<WeatherMetric>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &[WeatherMetric] {
        &self.metrics
    }
}

#[async_trait::async_trait]
impl MetricSink for MemorySink {
    async fn emit(&mut self, metric: &WeatherMetric) -> Result<()> {
        let mut stored = metric.clone();
        stored.id = Some(self.metrics.len() as i64 + 1);
        self.metrics.push(stored);
        Ok(())
    }
}
