use anyhow::Result;

use crate::WeatherMetric;

/// Storage collaborator for normalized metric records
#[async_trait::async_trait]
pub trait MetricSink: Send + Sync {
    async fn emit(&mut self, metric: &WeatherMetric) -> Result<()>;
}
