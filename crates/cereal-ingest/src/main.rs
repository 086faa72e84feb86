use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use tokio::fs::File;
use tokio::io::BufReader;

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    cereal_obs::init("cereal-ingest");

    // Config
    let cfg = match cereal_config::AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "invalid config, using defaults");
            cereal_config::AppConfig::default()
        }
    };

    let mut sinks = cereal_ingest::build_sinks(&cfg).await?;

    let summary = match cfg.input_path() {
        Some(path) => {
            let file = File::open(&path)
                .await
                .with_context(|| format!("opening {path}"))?;
            tracing::info!(%path, "ingesting readings");
            cereal_ingest::ingest_lines(BufReader::new(file), &mut sinks, now).await?
        }
        None => {
            tracing::info!("ingesting readings from stdin");
            cereal_ingest::ingest_lines(BufReader::new(tokio::io::stdin()), &mut sinks, now)
                .await?
        }
    };

    tracing::info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        metrics = summary.metrics,
        "ingest finished"
    );
    Ok(())
}
