use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tripforge_core::model::Credential;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credential store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Credential store parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Persistence for the OAuth credential between runs. The provider owns the
/// credential; callers only ever see short-lived copies.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<Credential>, StoreError>;
    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// YAML file store, by default under ~/.tripforge/.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        FileCredentialStore { path }
    }

    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|home| {
            FileCredentialStore::new(home.join(".tripforge").join("credential.yaml"))
        })
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(Some(serde_yaml::from_str(&content)?))
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_yaml::to_string(credential)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

/// In-memory store for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: tokio::sync::Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn with_credential(credential: Credential) -> Self {
        MemoryCredentialStore {
            credential: tokio::sync::Mutex::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.credential.lock().await.clone())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.credential.lock().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.credential.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential {
            access_token: "token".into(),
            refresh_token: "refresh".into(),
            expires_at: 1_750_000_000,
            api_base: "https://us.api.concursolutions.com".into(),
        }
    }

    #[tokio::test]
    async fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credential.yaml"));

        assert!(store.load().await.unwrap().is_none());
        store.save(&credential()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(credential()));
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
