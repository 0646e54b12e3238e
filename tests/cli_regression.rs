//! End-to-end CLI checks against the fixture configs.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn run_prints_the_bindings_of_a_valid_config() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("run").arg("tests/fixtures/sample.conf");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("name = weft"))
        .stdout(predicate::str::contains("retry.limit = 2"));
}

#[test]
fn run_streams_with_the_same_result() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("run").arg("tests/fixtures/sample.conf").arg("--stream");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("threads = 4"));
}

#[test]
fn run_without_cache_agrees_with_the_default() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("run")
        .arg("tests/fixtures/sample.conf")
        .arg("--no-cache");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("name = weft"));
}

#[test]
fn check_reports_the_farthest_failure_for_a_bad_config() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("check").arg("tests/fixtures/bad.conf");
    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("no match"))
        .stdout(predicate::str::contains("line 2"));
}

#[test]
fn trace_emits_dispatch_records_to_stderr() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("trace").arg("tests/fixtures/sample.conf");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("->"))
        .stderr(predicate::str::contains("<-"));
}

#[test]
fn run_fails_on_a_bad_config() {
    let mut cmd = Command::cargo_bin("weft").unwrap();
    cmd.arg("run").arg("tests/fixtures/bad.conf");
    cmd.assert().failure();
}
