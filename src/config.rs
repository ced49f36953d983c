use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Sync from the data source before printing headlines.
    #[serde(default = "default_sync_on_start")]
    pub sync_on_start: bool,

    /// Maximum number of headlines the demo binary prints per snapshot.
    #[serde(default = "default_headline_limit")]
    pub headline_limit: usize,

    #[serde(default)]
    pub default_topic_filter: Vec<String>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsstand");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("news.db").to_string_lossy().to_string()
}

fn default_sync_on_start() -> bool {
    true
}

fn default_headline_limit() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            sync_on_start: default_sync_on_start(),
            headline_limit: default_headline_limit(),
            default_topic_filter: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsstand")
            .join("config.toml")
    }
}
