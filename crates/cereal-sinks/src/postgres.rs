#![cfg(feature = "postgres")]
use anyhow::Result;
use cereal_core::{MetricSink, WeatherMetric};
use sqlx::{Pool, Postgres};

/// Stores metrics in the `station.metrics` table
pub struct PostgresSink {
    pool: Pool<Postgres>,
}

impl PostgresSink {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        sqlx::query("CREATE SCHEMA IF NOT EXISTS station")
            .execute(&pool)
            .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS station.metrics (
                id BIGSERIAL PRIMARY KEY,
                sensor TEXT NOT NULL,
                name TEXT NOT NULL,
                value DOUBLE PRECISION NOT NULL,
                unit_of_measure TEXT NOT NULL,
                date_time TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    /// Insert a metric and return its assigned id
    pub async fn insert(&self, metric: &WeatherMetric) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO station.metrics (sensor, name, value, unit_of_measure, date_time)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&metric.sensor)
        .bind(&metric.name)
        .bind(metric.value)
        .bind(&metric.unit_of_measure)
        .bind(metric.date_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

#[async_trait::async_trait]
impl MetricSink for PostgresSink {
    async fn emit(&mut self, metric: &WeatherMetric) -> Result<()> {
        self.insert(metric).await?;
        Ok(())
    }
}
