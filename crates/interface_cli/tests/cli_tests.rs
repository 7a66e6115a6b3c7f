//! End-to-end tests for the connbench binary
//!
//! These stop before any database connection is attempted.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn connbench() -> Command {
    let mut cmd = Command::cargo_bin("connbench").unwrap();
    cmd.env_remove("CONNBENCH_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn ini_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_help_lists_both_modes() {
    connbench()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pooled"))
        .stdout(predicate::str::contains("unpooled"));
}

#[test]
fn test_missing_mode_is_usage_error() {
    connbench().assert().failure().code(2);
}

#[test]
fn test_missing_config_file_fails() {
    connbench()
        .args(["unpooled", "--config", "/nonexistent/connbench.ini"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_section_fails() {
    let file = ini_file("[other]\nhost = localhost\n");

    connbench()
        .arg("pooled")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Section mysql not found"));
}

#[test]
fn test_incomplete_section_fails_before_connecting() {
    let file = ini_file("[mysql]\nhost = localhost\nuser = bench\n");

    connbench()
        .arg("unpooled")
        .arg("--config")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
