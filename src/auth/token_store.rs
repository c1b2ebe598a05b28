use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tempfile::NamedTempFile;

use super::Credential;
use crate::error::ClientError;

/// Process-wide holder of the bearer credential.
///
/// Reads are never cached: a `set` or `clear` is visible to the next `get`.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, ClientError>;

    fn set(&self, token: &str) -> Result<(), ClientError>;

    fn clear(&self) -> Result<(), ClientError>;

    fn credential(&self) -> Credential {
        self.credential_at(Utc::now())
    }

    fn credential_at(&self, now: DateTime<Utc>) -> Credential {
        match self.get() {
            Ok(token) => Credential::inspect(token, now),
            Err(e) => {
                tracing::warn!("Could not read stored credential: {}", e);
                Credential::Absent
            }
        }
    }
}

pub type SharedTokenStore = Arc<dyn TokenStore>;

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: RwLock::new(Some(token.into())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        let guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Keeps the credential under the `token` key of a small JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub const FILE_NAME: &'static str = "session.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SessionFile, ClientError> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SessionFile::default());
        }
        serde_json::from_str(&content)
            .map_err(|e| ClientError::Storage(format!("{}: {}", self.path.display(), e)))
    }

    /// Write a sibling temp file and rename it over the old one, so a
    /// concurrent reader sees either the previous session or the new one
    fn save(&self, file: &SessionFile) -> Result<(), ClientError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_vec_pretty(file)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| ClientError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>, ClientError> {
        Ok(self.load()?.token)
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        let mut file = self.load().unwrap_or_default();
        file.token = Some(token.to_string());
        self.save(&file)
    }

    fn clear(&self) -> Result<(), ClientError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut file = self.load().unwrap_or_default();
        file.token = None;
        self.save(&file)
    }
}
