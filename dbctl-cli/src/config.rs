///! CLI configuration management

use anyhow::Result;
use dbctl_core::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_server: String,
    pub default_namespace: String,
    pub default_output: String,
    pub token: Option<String>,
    pub log_level: String,
    pub json_logs: bool,
    /// Fallbacks for cluster definition, app version and template
    pub defaults: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_server: "http://localhost:8080".to_string(),
            default_namespace: "default".to_string(),
            default_output: "table".to_string(),
            token: None,
            log_level: "warn".to_string(),
            json_logs: false,
            defaults: PipelineConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config/dbctl/cli.toml"))
    }
}
