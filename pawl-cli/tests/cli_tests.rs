//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_run_modes() {
    Command::cargo_bin("pawl")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--verbose-sql"))
        .stdout(predicate::str::contains("--search"));
}

#[test]
fn missing_database_flag_fails_fast() {
    Command::cargo_bin("pawl")
        .unwrap()
        .args(["--user", "postgres"])
        .assert()
        .failure();
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("pawl")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pawl"));
}
