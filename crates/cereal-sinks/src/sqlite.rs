use anyhow::{anyhow, Result};
use cereal_core::{MetricSink, WeatherMetric};
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::sync::Mutex;
use tracing::debug;

/// Stores metrics in a SQLite `metrics` table
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sensor TEXT NOT NULL,
                name TEXT NOT NULL,
                value REAL NOT NULL,
                unit_of_measure TEXT NOT NULL,
                date_time TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }

    /// Insert a metric and return its assigned id
    pub fn insert(&self, metric: &WeatherMetric) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO metrics (sensor, name, value, unit_of_measure, date_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                metric.sensor,
                metric.name,
                metric.value,
                metric.unit_of_measure,
                metric.date_time.to_rfc3339()
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, sensor = %metric.sensor, name = %metric.name, "inserted metric");
        Ok(id)
    }

    /// All stored metrics for a sensor, oldest first
    pub fn metrics_for_sensor(&self, sensor: &str) -> Result<Vec<WeatherMetric>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, sensor, name, value, unit_of_measure, date_time
             FROM metrics WHERE sensor = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![sensor], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, f64>(3)?,
                r.get::<_, String>(4)?,
                r.get::<_, String>(5)?,
            ))
        })?;

        let mut metrics = Vec::new();
        for row in rows {
            let (id, sensor, name, value, unit_of_measure, date_time) = row?;
            metrics.push(WeatherMetric {
                id: Some(id),
                sensor,
                name,
                value,
                unit_of_measure,
                date_time: DateTime::parse_from_rfc3339(&date_time)?,
            });
        }
        Ok(metrics)
    }
}

#[async_trait::async_trait]
impl MetricSink for SqliteSink {
    async fn emit(&mut self, metric: &WeatherMetric) -> Result<()> {
        self.insert(metric)?;
        Ok(())
    }
}
