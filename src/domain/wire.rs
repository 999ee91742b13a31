//! Serde helpers for the persisted JSON layout.
//!
//! Dates are written as `YYYY-MM-DD`. Older snapshots stored full ISO-8601
//! timestamps (`2025-01-28T05:00:00.000Z`), so readers accept both forms.

use chrono::{DateTime, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a calendar date from either `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|stamp| stamp.with_timezone(&Utc).date_naive())
}

pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(super::DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date `{raw}`")))
    }
}

pub mod option_iso_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format(super::DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_iso_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date `{raw}`"))),
        }
    }
}
