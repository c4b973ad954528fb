//! CLI integration tests
//!
//! Tests the hostwarden CLI using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn hostwarden() -> Command {
    let mut cmd = Command::cargo_bin("hostwarden")
        .expect("Failed to locate hostwarden binary - ensure it's built before running tests");
    cmd.env_remove("HOSTWARDEN_SERVER");
    cmd
}

#[test]
fn test_cli_help() {
    hostwarden()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostwarden"))
        .stdout(predicate::str::contains("Agentless Linux host security assessment"));
}

#[test]
fn test_cli_version() {
    hostwarden()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostwarden"));
}

#[test]
fn test_cli_serve_help() {
    hostwarden()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"));
}

#[test]
fn test_cli_scan_help() {
    hostwarden()
        .args(["scan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-auto"))
        .stdout(predicate::str::contains("--no-wait"))
        .stdout(predicate::str::contains("--subnet"));
}

#[test]
fn test_cli_report_help() {
    hostwarden()
        .args(["report", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_cli_requires_subcommand() {
    hostwarden().assert().failure();
}

#[test]
fn test_cli_scan_requires_targets_file() {
    hostwarden().arg("scan").assert().failure();
}

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    hostwarden()
        .args(["config", "path", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    hostwarden()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    hostwarden()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("bind_address"))
        .stdout(predicate::str::contains("max_concurrent_targets"));
}

#[test]
fn test_scan_missing_targets_file() {
    let dir = tempfile::tempdir().unwrap();

    hostwarden()
        .args(["--server", "http://127.0.0.1:1", "scan"])
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load targets"));
}

#[test]
fn test_status_unreachable_server() {
    hostwarden()
        .args(["--server", "http://127.0.0.1:1", "status", "some-job"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to get job status"));
}
