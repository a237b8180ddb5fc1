//! Small persisted key/value store for state that outlives a session.
//!
//! Backed by a single JSON object on disk. Only the last display name is
//! stored today, under [`DISPLAY_NAME_KEY`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use huddle_common::ConfigError;
use tracing::debug;

/// Key under which the last-used display name is stored.
pub const DISPLAY_NAME_KEY: &str = "userName";

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform data directory, e.g. `~/.local/share/huddle/local_storage.json`.
    pub fn open_default() -> Result<Self, ConfigError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ConfigError::StateError("could not determine data directory".into()))?;
        Ok(Self::new(data_dir.join("huddle").join("local_storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        debug!(key, path = %self.path.display(), "local state saved");
        Ok(())
    }

    /// The display name used on the last successful join or create.
    pub fn last_display_name(&self) -> Result<Option<String>, ConfigError> {
        self.get(DISPLAY_NAME_KEY)
    }

    pub fn save_display_name(&self, name: &str) -> Result<(), ConfigError> {
        self.set(DISPLAY_NAME_KEY, name)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ConfigError::StateError(format!("failed to read {}: {e}", self.path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ConfigError::StateError(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::StateError(format!(
                    "failed to create state directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| ConfigError::StateError(format!("failed to serialize state: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            ConfigError::StateError(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}
