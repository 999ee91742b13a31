//! Cross-tab style synchronization: envelopes, broadcast channels, share codes
//! and the per-install device identity.

pub mod broadcast;
pub mod envelope;
pub mod share;

pub use broadcast::{channel, BroadcastChannel, ChannelBroadcast, NullBroadcast};
pub use envelope::{is_newer, SyncEnvelope};
pub use share::{ShareRecord, ShareService};

use uuid::Uuid;

use crate::errors::Result;
use crate::storage::StorageBackend;

pub const DEVICE_ID_KEY: &str = "device-id";
pub const CLOUD_BACKUP_KEY: &str = "cloud-backup";

/// Reads the stored device id, creating and persisting one on first use.
pub fn device_id(storage: &dyn StorageBackend) -> Result<String> {
    if let Some(raw) = storage.load_blob(DEVICE_ID_KEY)? {
        if let Ok(existing) = serde_json::from_str::<String>(&raw) {
            if !existing.trim().is_empty() {
                return Ok(existing);
            }
        }
        tracing::warn!("stored device id unreadable; issuing a new one");
    }
    let id = format!("device-{}", Uuid::new_v4().simple());
    storage.save_blob(DEVICE_ID_KEY, &serde_json::to_string(&id)?)?;
    tracing::info!(device = %id, "registered device");
    Ok(id)
}
