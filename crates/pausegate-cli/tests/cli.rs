use std::path::Path;

use assert_cmd::Command;
use predicates::str::{contains, starts_with};
use serde_json::Value;
use tempfile::TempDir;

fn pausegate(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pausegate"));
    cmd.env_remove("PAUSEGATE_DB_PATH")
        .env_remove("PAUSEGATE_CONFIG")
        .env("PAUSEGATE_DIR", dir)
        .arg("--db-path")
        .arg(dir.join("pausegate.db"))
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pausegate"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("Pausegate"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pausegate"));
    cmd.arg("--version").assert().success();
}

#[test]
fn test_cli_completions() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pausegate"));
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(starts_with("_pausegate"));
}

#[test]
fn test_small_order_is_auto_approved() {
    let dir = TempDir::new().unwrap();
    let outcome = json_stdout(pausegate(dir.path()).args([
        "--format",
        "json",
        "submit",
        "order-1",
        "-p",
        "containers=3",
    ]));
    assert_eq!(outcome["status"], "approved");
    assert_eq!(outcome["approval"], "auto");

    pausegate(dir.path())
        .arg("pending")
        .assert()
        .success()
        .stdout(contains("No pending approvals."));
}

#[test]
fn test_submit_pending_approve_flow() {
    let dir = TempDir::new().unwrap();
    let outcome = json_stdout(pausegate(dir.path()).args([
        "--format",
        "json",
        "submit",
        "order-2",
        "-p",
        "containers=10",
        "-p",
        "destination=Rotterdam",
        "-t",
        "containers",
    ]));
    assert_eq!(outcome["status"], "pending");
    assert_eq!(outcome["payload"]["containers"], 10);
    let token = outcome["resume_token"].as_str().unwrap().to_string();

    pausegate(dir.path())
        .arg("pending")
        .assert()
        .success()
        .stdout(contains("order-2"));

    pausegate(dir.path())
        .args(["approve", &token])
        .assert()
        .success()
        .stdout(contains("order-2 approved"));

    pausegate(dir.path())
        .args(["approve", &token])
        .assert()
        .failure()
        .stderr(contains("Unknown resume token"));

    let history = json_stdout(pausegate(dir.path()).args(["--format", "json", "history"]));
    assert_eq!(history[0]["status"], "approved");
}

#[test]
fn test_reject_with_reason() {
    let dir = TempDir::new().unwrap();
    let outcome = json_stdout(pausegate(dir.path()).args([
        "--format",
        "json",
        "submit",
        "order-3",
        "-p",
        "containers=9",
    ]));
    let token = outcome["resume_token"].as_str().unwrap().to_string();

    pausegate(dir.path())
        .args(["reject", &token, "--reason", "budget exceeded"])
        .assert()
        .success()
        .stdout(contains("rejected"))
        .stdout(contains("budget exceeded"));
}

#[test]
fn test_sweep_expires_with_zero_timeout() {
    let dir = TempDir::new().unwrap();
    pausegate(dir.path())
        .args(["submit", "order-4", "-p", "containers=20"])
        .assert()
        .success()
        .stdout(contains("waiting for approval"));

    let swept = json_stdout(pausegate(dir.path()).args([
        "--format",
        "json",
        "sweep",
        "--timeout-secs",
        "0",
    ]));
    assert_eq!(swept["expired"][0], "order-4");

    pausegate(dir.path())
        .arg("pending")
        .assert()
        .success()
        .stdout(contains("No pending approvals."));
}

#[test]
fn test_compact_transcript() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[compaction]\ncompaction_interval = 3\noverlap_size = 1\n",
    )
    .unwrap();
    let transcript = dir.path().join("transcript.json");
    std::fs::write(
        &transcript,
        r#"[
            {"author": "user", "content": "Ship 10 containers to Rotterdam"},
            {"author": "agent", "content": {"name": "place_shipping_order", "arguments": {"containers": 10}}},
            {"author": "tool", "content": {"name": "place_shipping_order", "output": "pending"}},
            {"author": "agent", "content": "Waiting for approval"}
        ]"#,
    )
    .unwrap();

    let result = json_stdout(
        pausegate(dir.path())
            .args(["--format", "json", "compact"])
            .arg(&transcript),
    );
    assert_eq!(result["passes"], 1);
    let entries = result["log"]["entries"].as_array().unwrap();
    // [summary of turns 0-1, turn 2, turn 3]
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["kind"], "summary");
    assert_eq!(entries[0]["covered_range"]["end"], 1);
    assert_eq!(entries[2]["turn_index"], 3);
}

#[test]
fn test_invalid_compaction_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[compaction]\ncompaction_interval = 3\noverlap_size = 5\n",
    )
    .unwrap();

    pausegate(dir.path())
        .arg("pending")
        .assert()
        .failure()
        .stderr(contains("Invalid compaction config"));
}
