use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use log::{info, warn};
use parking_lot::Mutex;

use crate::error::StoreError;

/// String-keyed slots of persisted text.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Slots kept as one JSON object in a file on disk.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write of the file.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_slots(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            slot: self.path.display().to_string(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read_slots()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        // A file that is not a slot map is replaced; one we cannot read is left alone.
        let mut slots = match self.read_slots() {
            Ok(slots) => slots,
            Err(StoreError::Malformed { slot, source }) => {
                warn!("Replacing malformed store {}: {}", slot, source);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        slots.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write then rename so a crash never leaves a half-written store.
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(&slots)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// In-process slots for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// An ordered list of tickers stored as a JSON array in one slot.
#[derive(Clone)]
pub struct PersistentList {
    store: Arc<dyn KeyValueStore>,
    slot: String,
}

impl PersistentList {
    pub fn new(store: Arc<dyn KeyValueStore>, slot: &str) -> Self {
        Self {
            store,
            slot: slot.to_string(),
        }
    }

    /// An absent slot, or one holding `null`, is an empty list.
    pub fn load(&self) -> Result<Vec<String>, StoreError> {
        let raw = match self.store.get(&self.slot)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        let list: Option<Vec<String>> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
                slot: self.slot.clone(),
                source,
            })?;
        let list = list.unwrap_or_default();
        info!("Loaded {} tickers from slot '{}'", list.len(), self.slot);
        Ok(list)
    }

    pub fn save(&self, tickers: &[String]) -> Result<(), StoreError> {
        self.store.set(&self.slot, &serde_json::to_string(tickers)?)
    }
}
