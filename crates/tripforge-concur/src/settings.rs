use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("No Concur settings found; create ~/.tripforge/concur.yaml")]
    Missing,
}

fn default_api_base() -> String {
    "https://us.api.concursolutions.com".into()
}

fn default_redirect_uri() -> String {
    "http://localhost:8157/callback".into()
}

fn default_currency() -> String {
    "USD".into()
}

/// OAuth client registration plus API defaults for one Concur tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurSettings {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl ConcurSettings {
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v0/token", self.api_base)
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/oauth2/v0/authorize", self.api_base)
    }
}

pub struct SettingsLoader;

impl SettingsLoader {
    /// Load from default locations:
    /// 1. ./concur.yaml
    /// 2. ~/.tripforge/concur.yaml
    pub async fn load_default() -> Result<ConcurSettings, SettingsError> {
        let local = PathBuf::from("./concur.yaml");
        if local.exists() {
            return Self::load_from(&local).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_settings = home.join(".tripforge").join("concur.yaml");
            if home_settings.exists() {
                return Self::load_from(&home_settings).await;
            }
        }

        Err(SettingsError::Missing)
    }

    pub async fn load_from(path: &Path) -> Result<ConcurSettings, SettingsError> {
        let content = tokio::fs::read_to_string(path).await?;
        let settings: ConcurSettings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn minimal_settings_fill_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "client_id: abc\nclient_secret: shh").unwrap();

        let settings = SettingsLoader::load_from(file.path()).await.unwrap();
        assert_eq!(settings.api_base, "https://us.api.concursolutions.com");
        assert_eq!(settings.currency, "USD");
        assert_eq!(
            settings.token_endpoint(),
            "https://us.api.concursolutions.com/oauth2/v0/token"
        );
    }
}
