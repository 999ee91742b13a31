#![doc(test(attr(deny(warnings))))]

//! Paycycle Core models a household's biweekly pay cycle: it derives pay periods
//! from an anchor payday, classifies bills into those periods, keeps recurring
//! bills topped up on a rolling horizon and persists the household state.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod sync;
pub mod time;
pub mod utils;

pub use crate::core::household_manager::{
    HouseholdManager, NewBill, Notice, NoticeLevel, SettingsUpdate,
};
pub use domain::{Bill, BillId, Frequency, HouseholdState, Period, Settings};
pub use errors::{HouseholdError, ShareCodeError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Paycycle Core tracing initialized.");
    });
}
