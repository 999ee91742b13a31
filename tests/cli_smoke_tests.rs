mod common;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("paycycle_cli").expect("binary built");
    cmd.env("PAYCYCLE_HOME", home)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn version_prints_build_banner() {
    let home = common::temp_base();
    cli(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("paycycle "));
}

#[test]
fn missing_command_prints_usage_and_fails() {
    let home = common::temp_base();
    cli(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: paycycle_cli"));
}

#[test]
fn first_run_shows_sample_overview() {
    let home = common::temp_base();
    cli(&home)
        .arg("overview")
        .assert()
        .success()
        .stdout(predicate::str::contains("The Johnson Family"))
        .stdout(predicate::str::contains("Available cash"))
        .stderr(predicate::str::contains("sample household"));
    assert!(home.join("data").join("household.json").exists());

    // Second run loads the saved household without the welcome notice.
    cli(&home)
        .arg("overview")
        .assert()
        .success()
        .stderr(predicate::str::contains("sample household").not());
}

#[test]
fn out_of_range_period_offset_is_rejected_and_not_saved() {
    let home = common::temp_base();
    cli(&home)
        .args(["overview", "7000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the supported date range"));
    cli(&home)
        .arg("overview")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available cash"));
    cli(&home).arg("calendar").assert().success();
}

#[test]
fn add_and_settings_round_trip() {
    let home = common::temp_base();
    cli(&home)
        .args(["add", "Internet", "69.99", "2030-01-15", "Utilities", "monthly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"))
        .stdout(predicate::str::contains("12 future instances"));

    cli(&home)
        .args(["settings", "name", "The Parkers"])
        .assert()
        .success();
    cli(&home)
        .arg("overview")
        .assert()
        .success()
        .stdout(predicate::str::contains("The Parkers"));
}

#[test]
fn rejects_unknown_frequency_and_bad_amount() {
    let home = common::temp_base();
    cli(&home)
        .args(["add", "Gym", "35", "2030-01-15", "Health", "yearly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
    cli(&home)
        .args(["add", "Gym", "-35", "2030-01-15", "Health", "weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn share_then_join_round_trip() {
    let home = common::temp_base();
    let output = cli(&home).arg("share").assert().success().get_output().clone();
    let code = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert_eq!(code.len(), 8);

    cli(&home)
        .args(["join", &code.to_lowercase()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Joined"));
    cli(&home)
        .args(["join", "NOTACODE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid share code"));
}

#[test]
fn calendar_events_and_maintain_run() {
    let home = common::temp_base();
    cli(&home)
        .arg("calendar")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sun  Mon"));
    cli(&home).arg("events").assert().success();
    cli(&home)
        .arg("maintain")
        .assert()
        .success()
        .stdout(predicate::str::contains("Maintenance: pruned 0"));
}

#[test]
fn reset_reloads_sample() {
    let home = common::temp_base();
    cli(&home).args(["settings", "name", "Temp"]).assert().success();
    cli(&home)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("reset to sample data"));
    cli(&home)
        .arg("overview")
        .assert()
        .success()
        .stdout(predicate::str::contains("The Johnson Family"));
}
