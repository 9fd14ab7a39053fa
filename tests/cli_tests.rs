//! CLI surface smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("losscut")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cut"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("probe"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("losscut")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("losscut"));
}

#[test]
fn test_cut_requires_time_range() {
    Command::cargo_bin("losscut")
        .unwrap()
        .args(["cut", "-i", "video.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from"));
}

#[test]
fn test_cut_rejects_unbalanced_ranges() {
    // The mismatch is rejected before any probe runs, so no engine binary
    // is needed here.
    Command::cargo_bin("losscut")
        .unwrap()
        .args([
            "cut", "-i", "missing.mp4", "--from", "1", "--from", "5", "--to", "3",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("matching --to"));
}

#[test]
fn test_merge_requires_two_inputs() {
    Command::cargo_bin("losscut")
        .unwrap()
        .args(["merge", "only-one.mp4"])
        .assert()
        .failure();
}
