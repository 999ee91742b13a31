mod common;

use std::fs;
use std::sync::Arc;

use common::{bill, date, household, setup_json_manager, temp_base};
use paycycle_core::{
    config::Config,
    storage::{JsonStorage, StorageBackend},
    sync::NullBroadcast,
    time::FixedClock,
    Frequency, HouseholdManager, HouseholdState, NoticeLevel,
};
use rust_decimal::Decimal;
use serde_json::Value;

fn tmp_path_for(path: &std::path::Path) -> std::path::PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

#[test]
fn state_round_trips_through_disk() {
    let dir = temp_base();
    let storage = JsonStorage::new(Some(dir.clone())).unwrap();
    let mut state = household(vec![
        bill("Rent", 1200, date(2025, 1, 14), Frequency::Monthly, false),
        bill("Phone", 85, date(2025, 1, 8), Frequency::Once, true),
    ]);
    state.bills[1].amount = Decimal::new(8549, 2);
    state.current_period_offset = -2;
    storage.save(&state).unwrap();

    let reopened = JsonStorage::new(Some(dir)).unwrap();
    assert_eq!(reopened.load().unwrap().unwrap(), state);
}

#[test]
fn written_json_uses_camel_case_wire_names() {
    let dir = temp_base();
    let storage = JsonStorage::new(Some(dir)).unwrap();
    let original = bill("Rent", 1200, date(2025, 1, 14), Frequency::Monthly, false);
    let instance = original.instance_for(date(2025, 2, 14), chrono::Utc::now());
    let mut state = household(vec![original, instance]);
    state.last_modified = Some(chrono::Utc::now());
    storage.save(&state).unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(storage.state_path()).unwrap()).unwrap();
    assert_eq!(raw["payday"], "2025-01-03");
    assert!(raw.get("biweeklyIncome").is_some());
    assert!(raw.get("currentPeriodOffset").is_some());
    assert!(raw["lastModified"].is_i64());
    let first = &raw["bills"][0];
    assert_eq!(first["dueDate"], "2025-01-14");
    assert_eq!(first["isRecurring"], true);
    assert_eq!(first["isPaid"], false);
    assert!(first.get("parentBillId").is_none());
    assert!(raw["bills"][1].get("parentBillId").is_some());
    assert!(raw["bills"][1].get("generatedAt").is_some());
}

#[test]
fn loads_snapshots_written_with_full_timestamps() {
    let dir = temp_base();
    let storage = JsonStorage::new(Some(dir)).unwrap();
    let id = paycycle_core::BillId::new();
    let raw = serde_json::json!({
        "payday": "2025-01-03T05:00:00.000Z",
        "biweeklyIncome": 2100,
        "bills": [{
            "id": id,
            "name": "Rent",
            "amount": 1200,
            "dueDate": "2025-01-14T05:00:00.000Z",
            "category": "Housing",
            "isPaid": false,
            "frequency": "monthly",
            "isRecurring": true,
            "createdAt": "2025-01-01T10:00:00.000Z"
        }],
        "currentPeriodOffset": 0,
        "settings": { "householdName": "The Johnsons", "partner1": "A", "partner2": "B" },
        "lastModified": 1735909200000i64
    });
    fs::write(storage.state_path(), raw.to_string()).unwrap();

    let state = storage.load().unwrap().unwrap();
    assert_eq!(state.payday, Some(date(2025, 1, 3)));
    assert_eq!(state.bills[0].due_date, date(2025, 1, 14));
    assert!(state.bills[0].is_recurring());
    assert!(state.settings.notifications);
}

#[test]
fn unknown_frequency_in_snapshot_falls_back_to_sample() {
    let dir = temp_base();
    let storage = JsonStorage::new(Some(dir)).unwrap();
    let raw = serde_json::json!({
        "payday": "2025-01-03",
        "biweeklyIncome": 2100,
        "bills": [{
            "id": paycycle_core::BillId::new(),
            "name": "Rent",
            "amount": 1200,
            "dueDate": "2025-01-14",
            "frequency": "quarterly"
        }]
    });
    fs::write(storage.state_path(), raw.to_string()).unwrap();
    assert!(storage.load().is_err());

    let clock = Arc::new(FixedClock::at_date(date(2025, 1, 8)));
    let mut manager = HouseholdManager::open(
        Box::new(storage.clone()),
        clock,
        Box::new(NullBroadcast),
        Config::default(),
    );
    let notices = manager.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(manager.state().settings.household_name, "The Johnson Family");
    // The sample replaces the unreadable snapshot on disk.
    assert_eq!(storage.load().unwrap().unwrap(), *manager.state());
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let dir = temp_base();
    let storage = JsonStorage::new(Some(dir)).unwrap();
    let state = household(vec![bill("Rent", 1200, date(2025, 1, 14), Frequency::Monthly, false)]);
    storage.save(&state).unwrap();
    let original = fs::read_to_string(storage.state_path()).unwrap();

    // A directory squatting on the temp file name makes File::create fail.
    fs::create_dir_all(tmp_path_for(storage.state_path())).unwrap();

    let mut changed = state.clone();
    changed.biweekly_income = Decimal::from(9999);
    assert!(storage.save(&changed).is_err());
    assert_eq!(fs::read_to_string(storage.state_path()).unwrap(), original);
}

#[test]
fn mutations_persist_across_reopen() {
    let (mut manager, storage, _) = setup_json_manager(date(2025, 1, 8));
    manager.take_notices();
    let target = manager.state().bills[0].id;
    manager.toggle_paid(target).unwrap();
    let expected = manager.state().clone();

    let clock = Arc::new(FixedClock::at_date(date(2025, 1, 9)));
    let mut reopened = HouseholdManager::open(
        Box::new(storage),
        clock,
        Box::new(NullBroadcast),
        Config::default(),
    );
    assert!(reopened.take_notices().is_empty());
    assert_eq!(reopened.state(), &expected);
}

#[test]
fn reset_restores_sample_and_rotates_device() {
    let (mut manager, storage, _) = setup_json_manager(date(2025, 1, 8));
    let device = manager.device_id().to_string();
    manager
        .update_settings(paycycle_core::SettingsUpdate {
            household_name: Some("Renamed".into()),
            ..Default::default()
        })
        .unwrap();
    manager.reset().unwrap();
    assert_eq!(manager.state().settings.household_name, "The Johnson Family");
    assert_ne!(manager.device_id(), device);
    assert_eq!(
        storage.load().unwrap().unwrap().settings.household_name,
        "The Johnson Family"
    );
}

#[test]
fn empty_household_round_trips() {
    let dir = temp_base();
    let storage = JsonStorage::new(Some(dir)).unwrap();
    storage.save(&HouseholdState::default()).unwrap();
    assert_eq!(storage.load().unwrap().unwrap(), HouseholdState::default());
}
