use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "CEREAL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Path of a JSON-lines readings file; "-" reads stdin
    pub input: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsSinkConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteSinkConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSinkConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinksConfig {
    pub fs: Option<FsSinkConfig>,
    pub sqlite: Option<SqliteSinkConfig>,
    pub postgres: Option<PostgresSinkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub ingest: Option<IngestConfig>,
    pub sinks: Option<SinksConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from CEREAL_CONFIG path (TOML) if present, with reasonable defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(path)
    }

    /// Load configuration from `path`, falling back to defaults when it does not exist
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Readings file to ingest; `None` means stdin
    pub fn input_path(&self) -> Option<String> {
        self.ingest
            .as_ref()
            .and_then(|i| i.input.clone())
            .filter(|p| p != "-")
    }

    /// Directory for the JSON-lines metric sink (default "data")
    pub fn fs_dir(&self) -> String {
        self.sinks
            .as_ref()
            .and_then(|s| s.fs.as_ref())
            .and_then(|f| f.dir.clone())
            .unwrap_or_else(|| "data".to_string())
    }

    pub fn sqlite_path(&self) -> Option<String> {
        self.sinks
            .as_ref()
            .and_then(|s| s.sqlite.as_ref())
            .and_then(|s| s.path.clone())
    }

    pub fn postgres_url(&self) -> Option<String> {
        self.sinks
            .as_ref()
            .and_then(|s| s.postgres.as_ref())
            .and_then(|p| p.url.clone())
    }
}
