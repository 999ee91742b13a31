#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use paycycle_core::{
    config::Config,
    storage::{JsonStorage, MemoryStorage, StorageBackend},
    sync::NullBroadcast,
    time::FixedClock,
    Bill, Frequency, HouseholdManager, HouseholdState,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn bill(name: &str, amount: i64, due: NaiveDate, frequency: Frequency, paid: bool) -> Bill {
    let mut bill = Bill::new(
        name,
        Decimal::from(amount),
        due,
        "General",
        frequency,
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
    );
    bill.is_paid = paid;
    bill
}

/// Household anchored on Friday 2025-01-03 with a 2000 income.
pub fn household(bills: Vec<Bill>) -> HouseholdState {
    HouseholdState {
        payday: Some(date(2025, 1, 3)),
        biweekly_income: Decimal::from(2000),
        bills,
        ..HouseholdState::default()
    }
}

/// Fresh directory that outlives the test body.
pub fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Manager over isolated on-disk storage, pinned to `today`.
pub fn setup_json_manager(today: NaiveDate) -> (HouseholdManager, JsonStorage, Arc<FixedClock>) {
    let storage = JsonStorage::new(Some(temp_base().join("data"))).expect("create json storage");
    let clock = Arc::new(FixedClock::at_date(today));
    let manager = HouseholdManager::open(
        Box::new(storage.clone()),
        clock.clone(),
        Box::new(NullBroadcast),
        Config::default(),
    );
    (manager, storage, clock)
}

/// Manager over shared in-memory storage seeded with `state`.
pub fn setup_memory_manager(
    state: &HouseholdState,
    today: NaiveDate,
) -> (HouseholdManager, MemoryStorage, Arc<FixedClock>) {
    let storage = MemoryStorage::new();
    storage.save(state).expect("seed state");
    let clock = Arc::new(FixedClock::at_date(today));
    let manager = HouseholdManager::open(
        Box::new(storage.clone()),
        clock.clone(),
        Box::new(NullBroadcast),
        Config::default(),
    );
    (manager, storage, clock)
}
