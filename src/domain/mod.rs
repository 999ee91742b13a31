//! Household domain models and persistence-friendly types.

pub mod bill;
pub mod frequency;
pub mod household;
pub mod period;
pub mod wire;

pub use bill::{Bill, BillId};
pub use frequency::{days_in_month, shift_month, Frequency};
pub use household::{HouseholdState, Settings};
pub use period::{is_payday, offset_containing, paydays_between, Period, PERIOD_LENGTH_DAYS};
