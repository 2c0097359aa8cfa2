//! Integration tests for the plagiscan CLI
//!
//! Every test runs in its own temporary directory with an explicit data
//! directory, so no implicit configuration or ledger leaks between tests.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SOURCE: &str = "def area(w, h):\n    # rectangle\n    return w * h\n";

/// CLI binary running inside `dir`
fn plagiscan_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("plagiscan").unwrap();
    cmd.current_dir(dir)
        .env_remove("PLAGISCAN_DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a command with `--format json` and parse its stdout.
fn run_json(dir: &TempDir, args: &[&str]) -> Value {
    let output = plagiscan_cmd(dir.path())
        .args(args)
        .args(["--format", "json", "--data-dir"])
        .arg(dir.path().join("data"))
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help_lists_commands() {
    let dir = tempdir().unwrap();
    plagiscan_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("validate-config"));
}

#[test]
fn test_print_default_config() {
    let dir = tempdir().unwrap();
    plagiscan_cmd(dir.path())
        .arg("print-default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("shingle_size: 5"))
        .stdout(predicate::str::contains("plagiarism_threshold: 0.65"));
}

#[test]
fn test_init_and_validate_config() {
    let dir = tempdir().unwrap();

    plagiscan_cmd(dir.path())
        .arg("init-config")
        .assert()
        .success();
    assert!(dir.path().join(".plagiscan.yml").exists());

    plagiscan_cmd(dir.path())
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    plagiscan_cmd(dir.path())
        .args(["init-config", "--force"])
        .assert()
        .success();

    // Picked up implicitly from the working directory.
    plagiscan_cmd(dir.path())
        .arg("validate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_config_rejects_bad_weights() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.yml");
    fs::write(
        &config,
        "scoring:\n  jaccard_weight: 0.5\n  structural_weight: 0.2\n",
    )
    .unwrap();

    plagiscan_cmd(dir.path())
        .arg("validate-config")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed"));
}

#[test]
fn test_submit_then_resubmit_is_flagged() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("area.py"), SOURCE).unwrap();

    let first = run_json(
        &dir,
        &["submit", "area.py", "--student", "alice", "--assignment", "hw1"],
    );
    assert_eq!(first["report"]["is_plagiarism"], false);
    assert!(first["report"].get("matched_work_id").is_none());

    let second = run_json(
        &dir,
        &["submit", "area.py", "--student", "bob", "--assignment", "hw1"],
    );
    assert_eq!(second["report"]["is_plagiarism"], true);
    assert_eq!(second["report"]["matched_work_id"], first["work_id"]);
    assert_eq!(second["report"]["similarity_score"], 1.0);

    let work_id = second["work_id"].as_str().unwrap();
    let report = run_json(&dir, &["report", work_id]);
    assert_eq!(report, second["report"]);
}

#[test]
fn test_upload_then_analyze() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("area.py"), SOURCE).unwrap();

    let stored = run_json(&dir, &["upload", "area.py"]);
    assert_eq!(stored["file_name"], "area.py");
    assert_eq!(stored["metrics"]["comment_lines"], 1);
    assert_eq!(stored["metrics"]["code_lines"], 2);

    let file_id = stored["file_id"].as_str().unwrap();
    let report = run_json(
        &dir,
        &["analyze", "--file-id", file_id, "--student", "alice", "--assignment", "hw1"],
    );
    assert_eq!(report["similarity_score"], 0.0);
}

#[test]
fn test_unknown_report_fails() {
    let dir = tempdir().unwrap();
    plagiscan_cmd(dir.path())
        .args(["report", "work_missing", "--data-dir"])
        .arg(dir.path().join("data"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("report not found: work_missing"));
}

#[test]
fn test_binary_upload_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("blob.bin"), [0xffu8, 0xfe, 0xfd]).unwrap();

    plagiscan_cmd(dir.path())
        .args(["submit", "blob.bin", "--student", "alice", "--assignment", "hw1"])
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_batch_flags_copies() {
    let dir = tempdir().unwrap();
    let subs = dir.path().join("subs");
    fs::create_dir_all(subs.join("alice")).unwrap();
    fs::create_dir_all(subs.join("bob")).unwrap();
    fs::create_dir_all(subs.join("carol")).unwrap();
    fs::write(subs.join("alice/area.py"), SOURCE).unwrap();
    fs::write(subs.join("bob/area.py"), SOURCE).unwrap();
    fs::write(
        subs.join("carol/area.py"),
        "import math\n\nprint(math.pi * 2 ** 2)\n",
    )
    .unwrap();

    let entries = run_json(&dir, &["batch", "subs", "--assignment", "hw1"]);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let students: Vec<_> = entries
        .iter()
        .map(|e| e["student_id"].as_str().unwrap())
        .collect();
    assert_eq!(students, vec!["alice", "bob", "carol"]);

    assert_eq!(entries[0]["receipt"]["report"]["is_plagiarism"], false);
    assert_eq!(entries[1]["receipt"]["report"]["is_plagiarism"], true);
    assert_eq!(
        entries[1]["receipt"]["report"]["matched_work_id"],
        entries[0]["receipt"]["work_id"]
    );
    assert_eq!(entries[2]["receipt"]["report"]["is_plagiarism"], false);

    let listing = run_json(&dir, &["list", "--assignment", "hw1"]);
    assert_eq!(listing.as_array().unwrap().len(), 3);

    let assignments = run_json(&dir, &["list"]);
    assert_eq!(assignments[0]["assignment_id"], "hw1");
    assert_eq!(assignments[0]["submissions"], 3);
}

#[test]
fn test_data_dir_from_environment() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("area.py"), SOURCE).unwrap();

    plagiscan_cmd(dir.path())
        .env("PLAGISCAN_DATA_DIR", dir.path().join("env-data"))
        .args(["submit", "area.py", "--student", "alice", "--assignment", "hw1"])
        .assert()
        .success();

    assert!(dir.path().join("env-data/ledger.json").exists());
}

#[test]
fn test_health_reports_counts() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("area.py"), SOURCE).unwrap();
    run_json(
        &dir,
        &["submit", "area.py", "--student", "alice", "--assignment", "hw1"],
    );

    let health = run_json(&dir, &["health"]);
    assert_eq!(health["healthy"], true);
    assert_eq!(health["submissions"], 1);
    assert_eq!(health["assignments"], 1);
}

#[test]
fn test_pretty_list_renders_table() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("area.py"), SOURCE).unwrap();
    run_json(
        &dir,
        &["submit", "area.py", "--student", "alice", "--assignment", "hw1"],
    );

    plagiscan_cmd(dir.path())
        .args(["list", "--assignment", "hw1", "--data-dir"])
        .arg(dir.path().join("data"))
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("work_"));
}

#[test]
fn test_batch_reports_failed_entries_and_exits_nonzero() {
    let dir = tempdir().unwrap();
    let subs = dir.path().join("subs");
    fs::create_dir_all(subs.join("alice")).unwrap();
    fs::create_dir_all(subs.join("bob")).unwrap();
    fs::write(subs.join("alice/area.py"), SOURCE).unwrap();
    fs::write(subs.join("bob/blob.bin"), [0xffu8, 0xfe, 0xfd]).unwrap();

    let output = plagiscan_cmd(dir.path())
        .args(["batch", "subs", "--assignment", "hw1", "--format", "json", "--data-dir"])
        .arg(dir.path().join("data"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 2 submissions failed"));

    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["student_id"], "alice");
    assert!(entries[0]["receipt"]["work_id"].is_string());
    assert_eq!(entries[1]["student_id"], "bob");
    assert_eq!(entries[1]["path"], "bob/blob.bin");
    assert!(entries[1]["error"].is_string());
}
