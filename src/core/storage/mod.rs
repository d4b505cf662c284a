//! Campaign persistence.
//!
//! A small key/value abstraction with a file-backed implementation (one
//! JSON document per key) and an in-memory one. [`CampaignStore`] layers
//! typed campaign access on top. Every key it touches is derived through
//! [`StorageKey::as_key`].

pub mod error;

pub use error::{Result, StorageError};

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::campaign::types::{CampaignInput, CampaignResult};

// ============================================================================
// Keys
// ============================================================================

/// Every location the application reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Ordered list of saved campaign ids.
    CampaignIndex,
    /// One campaign document.
    Campaign(String),
    /// Id of the campaign selected when the app last ran.
    SelectedCampaign,
    /// The last submitted creation form.
    LastInput,
}

impl StorageKey {
    /// The single mapping from logical key to storage key.
    pub fn as_key(&self) -> String {
        match self {
            StorageKey::CampaignIndex => "campaigns".to_string(),
            StorageKey::Campaign(id) => format!("campaign_{id}"),
            StorageKey::SelectedCampaign => "selected_campaign_id".to_string(),
            StorageKey::LastInput => "campaign_input".to_string(),
        }
    }
}

// ============================================================================
// Key/value backends
// ============================================================================

/// Minimal string key/value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        log::debug!("Opened file store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write to a sibling temp file and rename so readers never see a partial document.
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| StorageError::io(&path, e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }
}

/// Volatile store used by tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        map.remove(key);
        Ok(())
    }
}

// ============================================================================
// Typed campaign access
// ============================================================================

/// Typed access to persisted campaigns.
pub struct CampaignStore {
    kv: Box<dyn KeyValueStore>,
}

impl CampaignStore {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryKvStore::new())
    }

    fn read<T: DeserializeOwned>(&self, key: &StorageKey) -> Result<Option<T>> {
        let key = key.as_key();
        match self.kv.get(&key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Serialization { key, source }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &StorageKey, value: &T) -> Result<()> {
        let key = key.as_key();
        let raw = serde_json::to_string_pretty(value)
            .map_err(|source| StorageError::Serialization {
                key: key.clone(),
                source,
            })?;
        self.kv.set(&key, &raw)
    }

    pub fn load_index(&self) -> Result<Vec<String>> {
        Ok(self.read(&StorageKey::CampaignIndex)?.unwrap_or_default())
    }

    pub fn save_index(&self, ids: &[String]) -> Result<()> {
        self.write(&StorageKey::CampaignIndex, &ids)
    }

    pub fn load_campaign(&self, id: &str) -> Result<Option<CampaignResult>> {
        self.read(&StorageKey::Campaign(id.to_string()))
    }

    pub fn save_campaign(&self, campaign: &CampaignResult) -> Result<()> {
        self.write(&StorageKey::Campaign(campaign.id.clone()), campaign)
    }

    pub fn delete_campaign(&self, id: &str) -> Result<()> {
        self.kv.remove(&StorageKey::Campaign(id.to_string()).as_key())
    }

    pub fn load_selected(&self) -> Result<Option<String>> {
        self.read(&StorageKey::SelectedCampaign)
    }

    pub fn save_selected(&self, id: &str) -> Result<()> {
        self.write(&StorageKey::SelectedCampaign, &id)
    }

    pub fn clear_selected(&self) -> Result<()> {
        self.kv.remove(&StorageKey::SelectedCampaign.as_key())
    }

    pub fn load_last_input(&self) -> Result<Option<CampaignInput>> {
        self.read(&StorageKey::LastInput)
    }

    pub fn save_last_input(&self, input: &CampaignInput) -> Result<()> {
        self.write(&StorageKey::LastInput, input)
    }
}
