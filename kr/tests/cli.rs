//! End-to-end tests for the kairos binary
//!
//! Every run gets its own HOME, data, and config directories plus an explicit
//! config file pointing the database into the temp dir.

#![allow(deprecated)]
use std::path::PathBuf;

use assert_cmd::Command;
use goalstore::GoalStore;
use predicates::prelude::*;
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("kairos.db")
}

fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("kairos.yml")
}

fn kairos(dir: &TempDir) -> Command {
    let config = format!("storage:\n  db-path: {}\n", db_path(dir).display());
    std::fs::write(config_path(dir), config).unwrap();

    let mut cmd = Command::cargo_bin("kairos").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("NO_COLOR", "1")
        .env_remove("GEMINI_API_KEY")
        .arg("--config")
        .arg(config_path(dir));
    cmd
}

fn seed_goal(dir: &TempDir) {
    let mut store = GoalStore::open(db_path(dir)).unwrap();
    let goal = store.create_goal("Learn Go").unwrap();
    let syntax = store.add_milestone(goal.id, "Syntax").unwrap();
    let first = store.add_subtask(syntax.id, "Install Go").unwrap();
    store.add_subtask(syntax.id, "Read the tour").unwrap();
    store.toggle_subtask(first.id).unwrap();
    store.set_current_goal(goal.id).unwrap();
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    kairos(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("switch"))
        .stdout(predicate::str::contains("chill"))
        .stdout(predicate::str::contains("Logs are written to"));
}

#[test]
fn version_prints_package_version() {
    let dir = TempDir::new().unwrap();
    kairos(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn status_without_goal() {
    let dir = TempDir::new().unwrap();
    kairos(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active goal."));

    kairos(&dir)
        .args(["status", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));
}

#[test]
fn status_reports_progress() {
    let dir = TempDir::new().unwrap();
    seed_goal(&dir);

    kairos(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Learn Go (ACTIVE)"))
        .stdout(predicate::str::contains("Progress: 1/2 subtasks"));

    let output = kairos(&dir).args(["status", "-f", "json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["goal"], "Learn Go");
    assert_eq!(value["current_milestone"], "Syntax");
}

#[test]
fn switch_without_goals_prints_hint() {
    let dir = TempDir::new().unwrap();
    kairos(&dir)
        .arg("switch")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("kairos add"));
}

#[test]
fn focus_without_active_goal() {
    let dir = TempDir::new().unwrap();
    kairos(&dir)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active goal"));
}

#[test]
fn add_rejects_blank_goal() {
    let dir = TempDir::new().unwrap();
    kairos(&dir)
        .args(["add", "   "])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Goal must not be empty"));

    let store = GoalStore::open(db_path(&dir)).unwrap();
    assert!(store.list_goals().unwrap().is_empty());
}

#[test]
fn unknown_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    kairos(&dir)
        .args(["status", "--format", "table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}
