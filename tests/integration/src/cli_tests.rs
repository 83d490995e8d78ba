//! CLI smoke tests for the `guildctl` binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use guild_test_utils::config::TestConfigDir;
use guild_test_utils::fixtures;

fn guildctl() -> Command {
    Command::cargo_bin("guildctl").expect("guildctl binary")
}

fn project_config() -> TestConfigDir {
    let dir = TestConfigDir::new();
    dir.write_desired(&fixtures::project_server());
    dir
}

#[test]
fn no_command_prints_help_hint() {
    guildctl()
        .assert()
        .success()
        .stdout(predicate::str::contains("guildctl --help"));
}

#[test]
fn validate_accepts_a_valid_directory() {
    let config = project_config();
    guildctl()
        .args(["validate", "--config"])
        .arg(config.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn validate_rejects_duplicate_roles() {
    let config = TestConfigDir::new();
    config.write("roles.yaml", "roles:\n  - name: Mod\n  - name: Mod\n");
    guildctl()
        .args(["validate", "--config"])
        .arg(config.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate role name: Mod"));
}

#[test]
fn validate_reports_a_missing_directory() {
    let dir = TempDir::new().unwrap();
    guildctl()
        .args(["validate", "--config"])
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration directory not found"));
}

#[test]
fn plan_json_lists_the_fresh_setup_operations() {
    let config = project_config();
    let output = guildctl()
        .args(["plan", "--json", "--config"])
        .arg(config.root())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let outcome: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let operations = outcome["plan"].as_array().unwrap();
    assert!(!operations.is_empty());
    assert!(
        operations
            .iter()
            .any(|op| op["id"] == "channel/Info/general")
    );
}

#[test]
fn apply_then_plan_against_the_result_is_a_noop() {
    let config = project_config();
    let state_dir = TempDir::new().unwrap();
    let state = state_dir.path().join("state.yaml");

    guildctl()
        .args(["apply", "--config"])
        .arg(config.root())
        .arg("--out")
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("failed 0"));

    guildctl()
        .args(["plan", "--config"])
        .arg(config.root())
        .arg("--snapshot")
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to do"));
}

#[test]
fn apply_dry_run_leaves_the_snapshot_unwritten_operations_simulated() {
    let config = project_config();
    guildctl()
        .args(["apply", "--dry-run", "--config"])
        .arg(config.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("(dry run)"));
}

#[test]
fn backup_exports_a_loadable_configuration() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("state.yaml");
    let content = serde_yaml::to_string(&fixtures::project_snapshot()).unwrap();
    fs::write(&snapshot_path, content).unwrap();
    let backups = dir.path().join("backups");

    guildctl()
        .args(["backup", "--snapshot"])
        .arg(&snapshot_path)
        .arg("--out")
        .arg(&backups)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup written to"));

    let entries: Vec<_> = fs::read_dir(&backups).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let backup_dir = entries[0].as_ref().unwrap().path();
    assert!(backup_dir.join("roles.yaml").exists());
    assert!(backup_dir.join("channels.yaml").exists());
}
