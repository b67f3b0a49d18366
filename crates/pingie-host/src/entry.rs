//! Configured entries and their on-disk store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pingie_core::{CredentialRecord, EntryId, PingieError};
use serde::{Deserialize, Serialize};

/// One configured device or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: EntryId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub record: CredentialRecord,
}

impl ConfigEntry {
    pub fn new(title: impl Into<String>, record: CredentialRecord) -> Self {
        Self {
            entry_id: EntryId::generate(),
            title: title.into(),
            created_at: Utc::now(),
            record,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EntriesFile {
    #[serde(default)]
    entries: Vec<ConfigEntry>,
}

/// TOML file holding every configured entry as `[[entries]]`.
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
}

impl EntryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<ConfigEntry>, PingieError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No entry file, starting empty");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let file: EntriesFile = toml::from_str(&content)
            .map_err(|e| PingieError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(file.entries)
    }

    /// Replace the file contents with `entries`.
    pub fn save(&self, entries: &[ConfigEntry]) -> Result<(), PingieError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = EntriesFile {
            entries: entries.to_vec(),
        };
        let content = toml::to_string_pretty(&file)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "Saved entries");
        Ok(())
    }
}
