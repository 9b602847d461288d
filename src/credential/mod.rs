use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::ClientResult;

/// Storage key the bearer token lives under
pub const CREDENTIAL_KEY: &str = "bearerToken";

/// Single-slot store for the bearer credential.
///
/// Absence (`None`) is a state of its own. The store never validates or
/// expires the value; last write wins.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> ClientResult<Option<String>>;
    fn set(&self, value: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// In-process store, used for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(value: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(value.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> ClientResult<Option<String>> {
        Ok(self.slot.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn set(&self, value: &str) -> ClientResult<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Local-storage equivalent on disk: a flat JSON object of string keys.
///
/// Only `bearerToken` is touched; other keys in the file survive writes.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> ClientResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        // An unreadable file holds no usable credential; the next write replaces it
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("Ignoring unparseable storage file {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> ClientResult<Option<String>> {
        Ok(self.load()?.remove(CREDENTIAL_KEY))
    }

    fn set(&self, value: &str) -> ClientResult<()> {
        let mut entries = self.load()?;
        entries.insert(CREDENTIAL_KEY.to_string(), value.to_string());
        self.save(&entries)?;
        tracing::debug!("Saved bearer token to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut entries = self.load()?;
        if entries.remove(CREDENTIAL_KEY).is_some() {
            self.save(&entries)?;
            tracing::debug!("Removed bearer token from {}", self.path.display());
        }
        Ok(())
    }
}
