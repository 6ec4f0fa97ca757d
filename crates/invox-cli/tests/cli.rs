//! Integration tests for the invox binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("invox")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn batch_fails_on_empty_directory() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("invox")
        .unwrap()
        .arg("batch")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found"));
}

#[test]
fn batch_rejects_bad_batch_letter() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("inv.pdf"), b"stub").unwrap();

    Command::cargo_bin("invox")
        .unwrap()
        .arg("batch")
        .arg(dir.path())
        .args(["--batch-letter", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Batch letter"));
}

#[test]
fn process_rejects_missing_file() {
    Command::cargo_bin("invox")
        .unwrap()
        .arg("process")
        .arg("does-not-exist.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_show_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("invox")
        .unwrap()
        .current_dir(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("number_source"))
        .stdout(predicate::str::contains("filename_stem"));
}

#[test]
fn config_init_writes_file_and_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("invox.json");

    Command::cargo_bin("invox")
        .unwrap()
        .args(["config", "init", "--output"])
        .arg(&config_path)
        .assert()
        .success();
    assert!(config_path.exists());

    Command::cargo_bin("invox")
        .unwrap()
        .args(["config", "init", "--output"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
