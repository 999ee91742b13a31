use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{wire, Frequency};
use crate::errors::HouseholdError;

/// Stable identifier for a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(pub Uuid);

impl BillId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, enough to pick a bill from a short list.
    pub fn short(&self) -> String {
        self.0.simple().to_string().chars().take(8).collect()
    }
}

impl Default for BillId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BillId {
    type Err = HouseholdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(BillId)
            .map_err(|err| HouseholdError::InvalidInput(format!("bad bill id `{raw}`: {err}")))
    }
}

/// A dated obligation owed by the household.
///
/// Originals are entered by the user; generated instances carry the id of
/// their original in `parent_bill_id` and are never regenerated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BillRecord", into = "BillRecord")]
pub struct Bill {
    pub id: BillId,
    pub name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub category: String,
    pub is_paid: bool,
    pub frequency: Frequency,
    pub parent_bill_id: Option<BillId>,
    pub created_at: DateTime<Utc>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl Bill {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        due_date: NaiveDate,
        category: impl Into<String>,
        frequency: Frequency,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BillId::new(),
            name: name.into(),
            amount,
            due_date,
            category: category.into(),
            is_paid: false,
            frequency,
            parent_bill_id: None,
            created_at,
            generated_at: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.frequency.is_recurring()
    }

    pub fn is_original(&self) -> bool {
        self.parent_bill_id.is_none()
    }

    /// Recurring bills entered directly by the user drive instance generation.
    pub fn is_recurring_original(&self) -> bool {
        self.is_recurring() && self.is_original()
    }

    /// Builds the unpaid instance of this bill falling on `due_date`.
    pub fn instance_for(&self, due_date: NaiveDate, generated_at: DateTime<Utc>) -> Bill {
        Bill {
            id: BillId::new(),
            due_date,
            is_paid: false,
            parent_bill_id: Some(self.id),
            generated_at: Some(generated_at),
            ..self.clone()
        }
    }

    pub fn toggle_paid(&mut self) -> bool {
        self.is_paid = !self.is_paid;
        self.is_paid
    }
}

/// On-disk shape of a bill. `isRecurring` is written for readers of the raw
/// JSON and recomputed from `frequency` on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillRecord {
    id: BillId,
    name: String,
    amount: Decimal,
    #[serde(with = "wire::iso_date")]
    due_date: NaiveDate,
    #[serde(default)]
    category: String,
    #[serde(default)]
    is_paid: bool,
    #[serde(default)]
    frequency: Frequency,
    #[serde(default)]
    is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_bill_id: Option<BillId>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_at: Option<DateTime<Utc>>,
}

impl TryFrom<BillRecord> for Bill {
    type Error = HouseholdError;

    fn try_from(record: BillRecord) -> Result<Self, Self::Error> {
        if record.amount.is_sign_negative() && !record.amount.is_zero() {
            return Err(HouseholdError::MalformedState(format!(
                "bill `{}` has negative amount {}",
                record.name, record.amount
            )));
        }
        // Snapshots without a creation stamp fall back to midnight of the due date.
        let created_at = record.created_at.unwrap_or_else(|| {
            Utc.from_utc_datetime(&record.due_date.and_time(NaiveTime::default()))
        });
        Ok(Bill {
            id: record.id,
            name: record.name,
            amount: record.amount,
            due_date: record.due_date,
            category: record.category,
            is_paid: record.is_paid,
            frequency: record.frequency,
            parent_bill_id: record.parent_bill_id,
            created_at,
            generated_at: record.generated_at,
        })
    }
}

impl From<Bill> for BillRecord {
    fn from(bill: Bill) -> Self {
        BillRecord {
            id: bill.id,
            is_recurring: bill.is_recurring(),
            name: bill.name,
            amount: bill.amount,
            due_date: bill.due_date,
            category: bill.category,
            is_paid: bill.is_paid,
            frequency: bill.frequency,
            parent_bill_id: bill.parent_bill_id,
            created_at: Some(bill.created_at),
            generated_at: bill.generated_at,
        }
    }
}
