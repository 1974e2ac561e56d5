//! Settings store implementations.

use super::{SettingsPatch, SettingsStore, SyncSettings};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Key the settings live under inside the storage document.
pub const STORAGE_KEY: &str = "feishuSettings";

/// Settings persisted as a JSON document on disk.
///
/// The document is an object; settings occupy the [`STORAGE_KEY`] entry
/// and other entries are preserved on save.
pub struct FileSettingsStore {
    path: PathBuf,
    // Serializes read-modify-write within this process
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// Location of the settings document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the storage document. A missing file or a document that is not
    /// a JSON object reads as empty; other IO failures are returned.
    async fn read_document(&self) -> std::io::Result<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", self.path.display());
                return Ok(Map::new());
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!("Settings file {} is not a JSON object, using defaults", self.path.display());
                Ok(Map::new())
            }
        }
    }

    fn settings_from(document: &Map<String, Value>) -> SyncSettings {
        let Some(value) = document.get(STORAGE_KEY) else {
            return SyncSettings::default();
        };

        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Stored settings are invalid ({}), using defaults", e);
            SyncSettings::default()
        })
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> SyncSettings {
        match self.read_document().await {
            Ok(document) => Self::settings_from(&document),
            Err(e) => {
                warn!("Failed to read settings file {}: {}", self.path.display(), e);
                SyncSettings::default()
            }
        }
    }

    async fn save(&self, patch: SettingsPatch) -> Result<SyncSettings> {
        let _guard = self.write_lock.lock().await;

        // Refuse to write over a document we could not read
        let mut document = self.read_document().await.map_err(|e| {
            PipelineError::Storage(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let next = Self::settings_from(&document).merged(patch);

        let value = serde_json::to_value(&next)
            .map_err(|e| PipelineError::Storage(format!("failed to encode settings: {}", e)))?;
        document.insert(STORAGE_KEY.to_string(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                PipelineError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let content = serde_json::to_string_pretty(&Value::Object(document))
            .map_err(|e| PipelineError::Storage(format!("failed to encode settings: {}", e)))?;

        tokio::fs::write(&self.path, content).await.map_err(|e| {
            PipelineError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })?;

        debug!("Saved settings to {}", self.path.display());
        Ok(next)
    }
}

/// Settings held in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<SyncSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `settings`.
    pub fn with_settings(settings: SyncSettings) -> Self {
        Self { settings: Mutex::new(Some(settings)) }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> SyncSettings {
        self.settings.lock().await.clone().unwrap_or_default()
    }

    async fn save(&self, patch: SettingsPatch) -> Result<SyncSettings> {
        let mut slot = self.settings.lock().await;
        let next = slot.take().unwrap_or_default().merged(patch);
        *slot = Some(next.clone());
        Ok(next)
    }
}
