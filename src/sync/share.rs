use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::HouseholdState;
use crate::errors::{HouseholdError, Result, ShareCodeError};
use crate::storage::StorageBackend;

pub const SHARE_CODE_LEN: usize = 8;
const SHARE_PREFIX: &str = "share-";

/// A household snapshot parked under a short code for another device to join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub code: String,
    pub data: HouseholdState,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl ShareRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub fn share_key(code: &str) -> String {
    format!("{SHARE_PREFIX}{}", code.trim().to_uppercase())
}

pub fn new_share_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SHARE_CODE_LEN)
        .collect::<String>()
        .to_uppercase()
}

pub struct ShareService;

impl ShareService {
    pub fn publish(
        storage: &dyn StorageBackend,
        state: &HouseholdState,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            HouseholdError::Configuration(format!("share code lifetime {ttl} is out of range"))
        })?;
        let code = new_share_code();
        let record = ShareRecord {
            code: code.clone(),
            data: state.clone(),
            created_at: now,
            expires_at,
        };
        storage.save_blob(&share_key(&code), &serde_json::to_string(&record)?)?;
        tracing::info!(code = %code, expires_at = %record.expires_at, "published share code");
        Ok(code)
    }

    /// Looks up `code` case-insensitively. Expired records are removed.
    pub fn redeem(
        storage: &dyn StorageBackend,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<HouseholdState> {
        let key = share_key(code);
        let Some(raw) = storage.load_blob(&key)? else {
            tracing::warn!(code = %code, "unknown share code");
            return Err(ShareCodeError::Invalid.into());
        };
        let record: ShareRecord = serde_json::from_str(&raw).map_err(|err| {
            tracing::warn!(code = %code, error = %err, "unreadable share record");
            HouseholdError::from(ShareCodeError::Invalid)
        })?;
        if record.is_expired(now) {
            storage.remove_blob(&key)?;
            tracing::warn!(code = %code, "share code expired");
            return Err(ShareCodeError::Expired.into());
        }
        Ok(record.data)
    }
}
