use crate::primitives::StepOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tripforge_core::adapter::SiteAdapter;
use tripforge_core::model::SiteCredentials;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_poll_ms() -> u64 {
    150
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-primitive wait budget, milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Element poll interval, milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
    /// Optional site adapter file; the built-in TripIt adapter is used
    /// when absent.
    #[serde(default)]
    pub adapter: Option<PathBuf>,
    /// Sign-in credentials for the adapter's login form. Absent means the
    /// browser session is expected to be signed in already.
    #[serde(default)]
    pub credentials: Option<SiteCredentials>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            timeout_ms: default_timeout_ms(),
            poll_ms: default_poll_ms(),
            adapter: None,
            credentials: None,
        }
    }
}

impl EngineConfig {
    pub fn step_options(&self) -> StepOptions {
        StepOptions::from_millis(self.timeout_ms, self.poll_ms)
    }

    /// Resolve the configured site adapter, falling back to the built-in
    /// TripIt tables.
    pub async fn site_adapter(&self) -> Result<SiteAdapter, ConfigError> {
        match &self.adapter {
            Some(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                Ok(serde_yaml::from_str(&content)?)
            }
            None => Ok(SiteAdapter::tripit()),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./tripforge.yaml
    /// 2. ~/.tripforge/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<EngineConfig, ConfigError> {
        let local_config = PathBuf::from("./tripforge.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".tripforge").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(EngineConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<EngineConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
