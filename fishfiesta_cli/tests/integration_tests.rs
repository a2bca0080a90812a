//! Integration tests for the fishfiesta binary.
//!
//! These tests verify end-to-end behavior including:
//! - Playing levels to completion and failure
//! - Saving and resuming progress across runs
//! - Journal output and level listing
//! - Recovery from a corrupted progress store

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::cargo_bin("fishfiesta").expect("Failed to find fishfiesta binary")
}

fn write(dir: &Path, id: &str, body: &str) {
    fs::write(dir.join(format!("{}.json", id)), body).expect("Failed to write fixture");
}

/// Temp dir with `assets/` (two creatures, three levels) and an empty `data/`
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let fishes = temp_dir.path().join("assets/fishes");
    let levels = temp_dir.path().join("assets/levels");
    fs::create_dir_all(&fishes).unwrap();
    fs::create_dir_all(&levels).unwrap();

    write(
        &fishes,
        "trout",
        r#"{"description": "A speckled river fish.", "notableFeatures": "Red stripe",
            "minSize": 20, "maxSize": 30,
            "waterTypes": ["FRESH"], "waterSubtypes": ["RIVER", "LAKE"],
            "waterTemperatures": ["COLD", "MEDIUM"]}"#,
    );
    write(
        &fishes,
        "shark",
        r#"{"description": "An apex predator.", "notableFeatures": "Rows of teeth",
            "minSize": 300, "maxSize": 500,
            "waterTypes": ["SALT"], "waterSubtypes": ["OPEN_OCEAN"],
            "waterTemperatures": ["COLD", "MEDIUM", "WARM"]}"#,
    );
    write(
        &levels,
        "level1",
        r#"{"conditions": {"water_type": "fresh", "size": ["small"]},
            "fishIDs": ["trout", "shark"]}"#,
    );
    write(
        &levels,
        "level2",
        r#"{"conditions": {"water_type": "fresh", "size": ["small", "medium"]},
            "fishIDs": ["trout", "trout", "trout", "shark"]}"#,
    );
    write(&levels, "broken", r#"{"conditions": {"size": "big"}}"#);
    write(
        &levels,
        "missing_fish",
        r#"{"conditions": {"water_type": "fresh"}, "fishIDs": ["trout", "ghost"]}"#,
    );
    write(
        &levels,
        "bad_temperature",
        r#"{"conditions": {"water_type": "fresh", "temperature": "lukewarm"},
            "fishIDs": ["shark", "trout"]}"#,
    );

    temp_dir
}

fn play(temp_dir: &TempDir, level: &str, decisions: &str) -> assert_cmd::assert::Assert {
    cli()
        .arg("play")
        .arg(level)
        .arg("--decisions")
        .arg(decisions)
        .args(dir_args(temp_dir))
        .assert()
}

fn dir_args(temp_dir: &TempDir) -> Vec<PathBuf> {
    vec![
        PathBuf::from("--assets-dir"),
        temp_dir.path().join("assets"),
        PathBuf::from("--data-dir"),
        temp_dir.path().join("data"),
    ]
}

fn read_store(temp_dir: &TempDir) -> serde_json::Value {
    let path = temp_dir.path().join("data/fish_fiesta_level_data.json");
    let contents = fs::read_to_string(path).expect("Failed to read store");
    serde_json::from_str(&contents).expect("Store is not valid JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fish Fiesta habitat matching game"));
}

#[test]
fn test_levels_lists_all_levels() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("levels")
        .args(dir_args(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("broken"))
        .stdout(predicate::str::contains("level1"))
        .stdout(predicate::str::contains("not started"));
}

#[test]
fn test_correct_play_completes_level() {
    let temp_dir = setup_test_dir();

    play(&temp_dir, "level1", "ad")
        .success()
        .stdout(predicate::str::contains("Fish 1/2: Trout"))
        .stdout(predicate::str::contains("water_type: FRESH"))
        .stdout(predicate::str::contains("completed with 0 mistakes"));

    let store = read_store(&temp_dir);
    assert_eq!(store["level1.completed"], serde_json::json!(true));
    assert_eq!(store["level1.mistakes"], serde_json::json!(0));
    assert!(store.get("level1.in_progress").is_none());
}

#[test]
fn test_completed_level_is_not_replayed() {
    let temp_dir = setup_test_dir();
    play(&temp_dir, "level1", "ad").success();

    play(&temp_dir, "level1", "ad")
        .success()
        .stdout(predicate::str::contains("already completed"));
}

#[test]
fn test_quit_saves_progress_and_resume_finishes() {
    let temp_dir = setup_test_dir();

    // Wrong call on the trout, then quit
    play(&temp_dir, "level1", "dq")
        .success()
        .stdout(predicate::str::contains("Wrong!"))
        .stdout(predicate::str::contains("Progress saved for level1 (fish 1, 1 mistakes)"));

    cli()
        .arg("levels")
        .args(dir_args(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("in progress (fish 1, 1 mistakes)"));

    play(&temp_dir, "level1", "d")
        .success()
        .stdout(predicate::str::contains("Resuming at fish 2"))
        .stdout(predicate::str::contains("Fish 2/2: Shark"))
        .stdout(predicate::str::contains("completed with 1 mistakes"));
}

#[test]
fn test_script_running_out_saves_progress() {
    let temp_dir = setup_test_dir();

    play(&temp_dir, "level1", "a")
        .success()
        .stdout(predicate::str::contains("Progress saved"));

    let store = read_store(&temp_dir);
    assert_eq!(store["level1.in_progress"], serde_json::json!(true));
    assert_eq!(store["level1.fish_index"], serde_json::json!(1));
}

#[test]
fn test_three_mistakes_fail_level() {
    let temp_dir = setup_test_dir();

    play(&temp_dir, "level2", "ddd")
        .success()
        .stdout(predicate::str::contains("3 of 3 mistakes"))
        .stdout(predicate::str::contains("Level level2 failed"));

    let store = read_store(&temp_dir);
    assert_eq!(store["level2.failed"], serde_json::json!(true));
    assert_eq!(store["level2.mistakes"], serde_json::json!(3));
    assert!(store.get("level2.fish_index").is_none());

    // A failed level starts over
    play(&temp_dir, "level2", "q")
        .success()
        .stdout(predicate::str::contains("Fish 1/4"));
}

#[test]
fn test_reset_clears_progress() {
    let temp_dir = setup_test_dir();
    play(&temp_dir, "level1", "ad").success();

    cli()
        .arg("reset")
        .arg("level1")
        .args(dir_args(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared progress for level1"));

    let store = read_store(&temp_dir);
    assert_eq!(store["level1.completed"], serde_json::json!(false));
    assert_eq!(store["level1.fish_index"], serde_json::json!(0));

    play(&temp_dir, "level1", "ad")
        .success()
        .stdout(predicate::str::contains("completed with 0 mistakes"));
}

#[test]
fn test_journal_entry() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("journal")
        .arg("shark")
        .args(dir_args(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("Shark"))
        .stdout(predicate::str::contains("Notable features: Rows of teeth"))
        .stdout(predicate::str::contains("making it a big fish"))
        .stdout(predicate::str::contains("enjoys any type of water temperature"));
}

#[test]
fn test_unknown_creature_journal_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("journal")
        .arg("nemo")
        .args(dir_args(&temp_dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to load creature nemo"));
}

#[test]
fn test_broken_and_unknown_levels_fail() {
    let temp_dir = setup_test_dir();

    play(&temp_dir, "broken", "a")
        .failure()
        .stderr(predicate::str::contains("Unable to load level broken"));

    play(&temp_dir, "level99", "a")
        .failure()
        .stderr(predicate::str::contains("Unknown level: level99"));
}

#[test]
fn test_invalid_decision_script_rejected() {
    let temp_dir = setup_test_dir();

    play(&temp_dir, "level1", "ax")
        .failure()
        .stderr(predicate::str::contains("unknown decision 'x'"));
}

#[test]
fn test_corrupted_store_is_replaced() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("fish_fiesta_level_data.json"), "{ invalid json }}}")
        .expect("Failed to write corrupted store");

    play(&temp_dir, "level1", "ad").success();

    let store = read_store(&temp_dir);
    assert_eq!(store["level1.completed"], serde_json::json!(true));
}

fn write_store(temp_dir: &TempDir, body: serde_json::Value) {
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("fish_fiesta_level_data.json"), body.to_string())
        .expect("Failed to write store");
}

#[test]
fn test_missing_creature_saves_earlier_decisions() {
    let temp_dir = setup_test_dir();

    play(&temp_dir, "missing_fish", "aa")
        .failure()
        .stdout(predicate::str::contains("Correct!"))
        .stdout(predicate::str::contains("Progress saved for missing_fish (fish 1, 0 mistakes)"))
        .stderr(predicate::str::contains("Unable to load creature ghost"));

    let store = read_store(&temp_dir);
    assert_eq!(store["missing_fish.in_progress"], serde_json::json!(true));
    assert_eq!(store["missing_fish.fish_index"], serde_json::json!(1));
}

#[test]
fn test_invalid_condition_saves_earlier_decisions() {
    let temp_dir = setup_test_dir();

    // The shark fails water_type before temperature is looked at
    play(&temp_dir, "bad_temperature", "dd")
        .failure()
        .stdout(predicate::str::contains("Fish 2/2: Trout"))
        .stderr(predicate::str::contains("Unable to judge Trout"));

    let store = read_store(&temp_dir);
    assert_eq!(store["bad_temperature.in_progress"], serde_json::json!(true));
    assert_eq!(store["bad_temperature.fish_index"], serde_json::json!(1));
}

#[test]
fn test_resume_past_last_fish_completes_without_resume_line() {
    let temp_dir = setup_test_dir();
    write_store(
        &temp_dir,
        serde_json::json!({
            "level1.in_progress": true,
            "level1.mistakes": 1,
            "level1.fish_index": 2
        }),
    );

    play(&temp_dir, "level1", "q")
        .success()
        .stdout(predicate::str::contains("Resuming").not())
        .stdout(predicate::str::contains("completed with 1 mistakes"));
}

#[test]
fn test_stored_attempt_at_mistake_limit_is_failed() {
    let temp_dir = setup_test_dir();
    write_store(
        &temp_dir,
        serde_json::json!({
            "level1.in_progress": true,
            "level1.mistakes": 3,
            "level1.fish_index": 0
        }),
    );

    cli()
        .arg("levels")
        .args(dir_args(&temp_dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("failed"));

    play(&temp_dir, "level1", "a")
        .success()
        .stdout(predicate::str::contains("Fish 1/2").not())
        .stdout(predicate::str::contains("Level level1 failed"));

    let store = read_store(&temp_dir);
    assert_eq!(store["level1.failed"], serde_json::json!(true));
    assert!(store.get("level1.in_progress").is_none());
}
