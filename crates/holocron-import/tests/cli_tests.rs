//! Smoke tests for the holocron-import binary
//!
//! These run the compiled binary and only exercise argument handling, so
//! no database or upstream catalog is required.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("holocron-import").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("holocron-import").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("holocron-import"));
}

#[test]
fn test_rejects_unknown_flag() {
    let mut cmd = Command::cargo_bin("holocron-import").unwrap();
    cmd.arg("--bogus").assert().failure();
}
