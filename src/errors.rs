use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::BillId;

/// Error type covering period math, persisted state and sync failures.
#[derive(Debug, Error)]
pub enum HouseholdError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Malformed state: {0}")]
    MalformedState(String),
    #[error(transparent)]
    ShareCode(#[from] ShareCodeError),
    #[error("Instance of bill {parent} due {due_date} already exists")]
    DuplicateInstance { parent: BillId, due_date: NaiveDate },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Bill not found: {0}")]
    BillNotFound(BillId),
    #[error("Persistence error: {0}")]
    Storage(String),
}

/// Reasons a household share code cannot be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShareCodeError {
    #[error("Invalid share code")]
    Invalid,
    #[error("Share code has expired")]
    Expired,
}

pub type Result<T> = std::result::Result<T, HouseholdError>;

impl From<std::io::Error> for HouseholdError {
    fn from(err: std::io::Error) -> Self {
        HouseholdError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for HouseholdError {
    fn from(err: serde_json::Error) -> Self {
        HouseholdError::MalformedState(err.to_string())
    }
}

impl HouseholdError {
    /// True for failures the caller recovers from by substituting sample state.
    pub fn is_recoverable_by_default(&self) -> bool {
        matches!(self, HouseholdError::MalformedState(_))
    }
}
