//! CLI integration tests for the worktrail command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Event logs replay into the expected snapshots without a narration backend
//! - Invalid inputs are rejected with appropriate messages
//!
//! Every test points `WORKTRAIL_CONFIG_DIR` at a temporary directory so the
//! user's own config and logs are left alone.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the worktrail binary with an isolated config dir.
fn worktrail(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("worktrail").unwrap();
    cmd.env("WORKTRAIL_CONFIG_DIR", config_dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("GROQ_API_KEY")
        .env_remove("LLM_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

const SESSION_LOG: &str = r#"# x.txt: "a" -> "ab", then y.txt: "" -> "y", then a command
{"type":"text_change","file":"x.txt","text":"ab","edits":[{"offset":1,"length_removed":1,"inserted_text":""}]}
{"type":"text_change","file":"y.txt","text":"y","edits":[{"offset":0,"length_removed":1,"inserted_text":""}]}
{"type":"command_start","command":"echo hi"}
{"type":"command_end","command":"echo hi"}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let config = TempDir::new().unwrap();
    worktrail(config.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_displays() {
    let config = TempDir::new().unwrap();
    worktrail(config.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("worktrail"));
}

#[test]
fn test_replay_help() {
    let config = TempDir::new().unwrap();
    worktrail(config.path())
        .args(["replay", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-narrate"))
        .stdout(predicate::str::contains("--workspace"));
}

#[test]
fn test_unknown_subcommand_rejected() {
    let config = TempDir::new().unwrap();
    worktrail(config.path()).arg("record").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Replay Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_replay_without_narration_json() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, SESSION_LOG).unwrap();

    let output = worktrail(config.path())
        .args(["--json", "replay", "--no-narrate", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .output()
        .unwrap();
    assert!(output.status.success());

    let snapshots: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let snapshots = snapshots.as_array().unwrap();
    assert_eq!(snapshots.len(), 3);

    assert_eq!(snapshots[0]["type"], "file_diff");
    assert_eq!(snapshots[0]["file"], "x.txt");
    assert!(snapshots[0]["diff"].as_str().unwrap().contains("+ab"));

    assert_eq!(snapshots[1]["type"], "file_diff");
    assert_eq!(snapshots[1]["file"], "y.txt");

    assert_eq!(snapshots[2]["type"], "terminal_command");
    assert_eq!(snapshots[2]["command"], "echo hi");
}

#[test]
fn test_replay_without_narration_text() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, SESSION_LOG).unwrap();

    worktrail(config.path())
        .args(["replay", "--no-narrate", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("edit x.txt"))
        .stdout(predicate::str::contains("edit y.txt"))
        .stdout(predicate::str::contains("$ echo hi"));
}

#[test]
fn test_verbose_logs_recorder_and_session_to_stderr() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, SESSION_LOG).unwrap();

    worktrail(config.path())
        .args(["--verbose", "replay", "--no-narrate", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .assert()
        .success()
        .stderr(predicate::str::contains("Started editing file"))
        .stderr(predicate::str::contains("Recording started"));
}

#[test]
fn test_rust_log_overrides_console_filter() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, SESSION_LOG).unwrap();

    worktrail(config.path())
        .env("RUST_LOG", "worktrail_recorder=debug")
        .args(["replay", "--no-narrate", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .assert()
        .success()
        .stderr(predicate::str::contains("Started editing file"))
        .stderr(predicate::str::contains("Recording started").not());
}

#[test]
fn test_replay_respects_ignore_patterns() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("worktrail.toml"),
        "[recording]\nignore = [\"x.txt\"]\n",
    )
    .unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, SESSION_LOG).unwrap();

    worktrail(config.path())
        .args(["replay", "--no-narrate", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("edit x.txt").not())
        .stdout(predicate::str::contains("edit y.txt"));
}

#[test]
fn test_replay_empty_log_needs_no_backend() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, "\n").unwrap();

    worktrail(config.path())
        .args(["--json", "replay", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"empty\""));
}

#[test]
fn test_replay_missing_log_fails() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    worktrail(config.path())
        .args(["replay", "--no-narrate", "--workspace"])
        .arg(workspace.path())
        .arg(workspace.path().join("missing.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read event log"));
}

#[test]
fn test_replay_malformed_log_fails() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, "{\"type\":\"teleport\"}\n").unwrap();

    worktrail(config.path())
        .args(["replay", "--no-narrate", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("events.jsonl:1"));
}

#[test]
fn test_replay_without_api_key_fails() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let log = workspace.path().join("events.jsonl");
    fs::write(&log, SESSION_LOG).unwrap();

    worktrail(config.path())
        .args(["replay", "--workspace"])
        .arg(workspace.path())
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Find and Config Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_find_without_workflows() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    worktrail(config.path())
        .args(["--json", "find", "seed", "the", "database", "--workspace"])
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"no_workflows\""));
}

#[test]
fn test_config_path_lists_sources() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    worktrail(config.path())
        .current_dir(workspace.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("worktrail.toml"));
}

#[test]
fn test_config_show_reads_project_file() {
    let config = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("worktrail.toml"),
        "[llm]\nbackend = \"ollama\"\n",
    )
    .unwrap();

    worktrail(config.path())
        .current_dir(workspace.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ollama / llama3.2"));
}
