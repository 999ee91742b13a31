pub mod json_backend;
pub mod memory;

use crate::domain::HouseholdState;

pub use crate::errors::Result;

/// Persistence for the household snapshot plus small keyed blobs
/// (device identity, share codes, the last published envelope).
pub trait StorageBackend: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<HouseholdState>>;
    fn save(&self, state: &HouseholdState) -> Result<()>;

    fn load_blob(&self, key: &str) -> Result<Option<String>>;
    fn save_blob(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing blob is not an error.
    fn remove_blob(&self, key: &str) -> Result<()>;
    fn blob_keys(&self) -> Result<Vec<String>>;

    /// Drops the snapshot and every blob.
    fn clear(&self) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
