//! Fast CLI tests using assert_cmd.
//! These test the binary directly without needing a container runtime.

#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but works fine

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_flag() {
    Command::cargo_bin("tbx")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Toolbox Container Dispatcher"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("tbx")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_subcommand_help() {
    for subcmd in &["list", "start", "stop", "exec", "connect", "open", "config"] {
        Command::cargo_bin("tbx")
            .unwrap()
            .args([subcmd, "--help"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty().not());
    }
}

#[test]
fn test_unknown_subcommand_fails() {
    Command::cargo_bin("tbx")
        .unwrap()
        .arg("nonexistent-subcommand")
        .assert()
        .failure();
}

#[test]
fn test_invalid_sandbox_mode_fails() {
    Command::cargo_bin("tbx")
        .unwrap()
        .args(["--sandbox", "sometimes", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sometimes"));
}

#[test]
fn test_open_requires_file() {
    Command::cargo_bin("tbx")
        .unwrap()
        .arg("open")
        .assert()
        .failure();
}

#[test]
fn test_config_path_prints_override() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("custom.toml");
    Command::cargo_bin("tbx")
        .unwrap()
        .args(["config", "--path"])
        .env("TBX_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_shows_defaults_when_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    Command::cargo_bin("tbx")
        .unwrap()
        .arg("config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("not created yet"))
        .stdout(predicate::str::contains("distrobox-enter"));
}

#[test]
fn test_broken_config_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[tools\nruntime = ").unwrap();
    Command::cargo_bin("tbx")
        .unwrap()
        .arg("list")
        .env("TBX_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_invalid_config_values_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[defaults]\nquery_timeout_secs = 0\n").unwrap();
    Command::cargo_bin("tbx")
        .unwrap()
        .arg("list")
        .env("TBX_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("query_timeout_secs"));
}
