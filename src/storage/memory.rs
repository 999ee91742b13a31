use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::domain::HouseholdState;
use crate::errors::HouseholdError;

use super::{Result, StorageBackend};

#[derive(Debug, Default)]
struct Slots {
    state: Option<String>,
    blobs: BTreeMap<String, String>,
}

/// In-process storage holding serialized JSON, so loads exercise the same
/// parsing path as the filesystem backend. Clones share the same slots,
/// which lets two managers act as tabs over one store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<Slots>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored snapshot with raw text, valid or not.
    pub fn put_raw_state(&self, raw: impl Into<String>) -> Result<()> {
        self.slots()?.state = Some(raw.into());
        Ok(())
    }

    pub fn raw_state(&self) -> Result<Option<String>> {
        Ok(self.slots()?.state.clone())
    }

    fn slots(&self) -> Result<MutexGuard<'_, Slots>> {
        self.slots
            .lock()
            .map_err(|_| HouseholdError::Storage("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<HouseholdState>> {
        match self.slots()?.state.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &HouseholdState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.slots()?.state = Some(json);
        Ok(())
    }

    fn load_blob(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots()?.blobs.get(key).cloned())
    }

    fn save_blob(&self, key: &str, value: &str) -> Result<()> {
        self.slots()?.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        self.slots()?.blobs.remove(key);
        Ok(())
    }

    fn blob_keys(&self) -> Result<Vec<String>> {
        Ok(self.slots()?.blobs.keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        let mut slots = self.slots()?;
        slots.state = None;
        slots.blobs.clear();
        Ok(())
    }
}
