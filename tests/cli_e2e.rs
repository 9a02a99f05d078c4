//! End-to-end CLI tests for the dropwatch binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_VARS: [&str; 12] = [
    "TORBOX_WATCH_FOLDER",
    "TORBOX_API_KEY",
    "TORBOX_FOLDER_ID",
    "TORBOX_API_BASE",
    "TORBOX_API_VERSION",
    "DELETE_AFTER_UPLOAD",
    "DROPWATCH_MAX_RETRIES",
    "DROPWATCH_RETRY_DELAY_MS",
    "DROPWATCH_UPLOAD_TIMEOUT",
    "DROPWATCH_SETTLE_MS",
    "DROPWATCH_CONCURRENCY",
    "DROPWATCH_SANITIZE_NAMES",
];

/// Binary with every configuration variable cleared.
fn dropwatch() -> Command {
    let mut cmd = Command::cargo_bin("dropwatch").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    dropwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Watch a folder"))
        .stdout(predicate::str::contains("--watch-folder"))
        .stdout(predicate::str::contains("TORBOX_API_KEY"));
}

#[test]
fn test_binary_version_displays_version() {
    dropwatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dropwatch"));
}

#[test]
fn test_binary_without_settings_fails() {
    dropwatch()
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    dropwatch()
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_out_of_range_concurrency() {
    dropwatch()
        .args(["-w", "/tmp", "-k", "key", "-c", "0"])
        .assert()
        .failure();
}

#[test]
fn test_binary_rejects_blank_api_key() {
    dropwatch()
        .args(["-w", "/tmp", "-k", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_binary_missing_folder_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");

    dropwatch()
        .arg("-w")
        .arg(&missing)
        .args(["-k", "key", "--no-color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_binary_reads_settings_from_env() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("env-folder");

    dropwatch()
        .env("TORBOX_WATCH_FOLDER", &missing)
        .env("TORBOX_API_KEY", "key")
        .env("NO_COLOR", "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("env-folder"));
}

#[test]
fn test_binary_rejects_unrecognized_delete_flag_value() {
    dropwatch()
        .args(["-w", "/tmp", "-k", "key"])
        .env("DELETE_AFTER_UPLOAD", "disabled")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_binary_accepts_boolish_delete_flag_values() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("not-here");

    for value in ["true", "FALSE", "yes", "0"] {
        // Getting as far as the folder check means the flag value parsed.
        dropwatch()
            .arg("-w")
            .arg(&missing)
            .args(["-k", "key"])
            .env("DELETE_AFTER_UPLOAD", value)
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }
}
