use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::HouseholdState;

/// A published snapshot of one device's household state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEnvelope {
    pub device_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub data: HouseholdState,
}

impl SyncEnvelope {
    pub fn new(device_id: impl Into<String>, timestamp: DateTime<Utc>, data: HouseholdState) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            data,
        }
    }
}

/// Last-write-wins: an unset local stamp loses to any remote one, ties keep local.
pub fn is_newer(remote: DateTime<Utc>, local: Option<DateTime<Utc>>) -> bool {
    match local {
        Some(local) => remote > local,
        None => remote.timestamp_millis() > 0,
    }
}
