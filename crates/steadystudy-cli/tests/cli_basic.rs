//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a temporary config home and verify
//! outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_steadystudy"))
        .args(args)
        .env("STEADYSTUDY_HOME", home)
        .env_remove("STEADYSTUDY_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("Failed to write stdin");
        }
    }
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_free_from_stdin() {
    let home = tempfile::tempdir().unwrap();
    let constraint = r#"{
        "horizon": { "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T12:00:00Z" },
        "busy": [
            { "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T10:00:00Z" },
            { "start": "2024-01-01T09:30:00Z", "end": "2024-01-01T11:00:00Z" }
        ],
        "min_duration_minutes": 0
    }"#;

    let (stdout, stderr, code) = run_cli(home.path(), &["free"], Some(constraint));
    assert_eq!(code, 0, "free failed: {stderr}");

    let blocks = parse_json(&stdout);
    let blocks = blocks.as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["start"], "2024-01-01T11:00:00Z");
    assert_eq!(blocks[0]["end"], "2024-01-01T12:00:00Z");
    assert_eq!(blocks[0]["duration_minutes"], 60);
}

#[test]
fn test_free_from_file_with_min_override() {
    let home = tempfile::tempdir().unwrap();
    let path = home.path().join("constraint.json");
    std::fs::write(
        &path,
        r#"{
            "horizon": { "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T11:00:00Z" },
            "busy": [{ "start": "2024-01-01T09:44:00Z", "end": "2024-01-01T10:15:00Z" }]
        }"#,
    )
    .unwrap();

    let path = path.to_string_lossy().to_string();
    let (stdout, _, code) = run_cli(home.path(), &["free", "--input", &path, "--min", "45"], None);
    assert_eq!(code, 0);
    let blocks = parse_json(&stdout);
    // 44 minutes before the busy span is dropped, 45 after it is kept.
    assert_eq!(blocks.as_array().unwrap().len(), 1);
    assert_eq!(blocks[0]["start"], "2024-01-01T10:15:00Z");
}

#[test]
fn test_free_rejects_reversed_horizon() {
    let home = tempfile::tempdir().unwrap();
    let constraint = r#"{
        "horizon": { "start": "2024-01-02T00:00:00Z", "end": "2024-01-01T00:00:00Z" }
    }"#;
    let (_, stderr, code) = run_cli(home.path(), &["free"], Some(constraint));
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_plan_with_events_and_message() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "study.deadline_buffer_days", "0"], None);
    assert_eq!(code, 0);

    let request = r#"{
        "horizon": { "start": "2024-01-01T00:00:00Z", "end": "2024-01-02T00:00:00Z" },
        "events": [
            { "id": "ev-1", "title": "Lecture", "start_time": "2024-01-01T15:00:00Z", "end_time": "2024-01-01T15:30:00Z" }
        ],
        "tasks": [
            { "id": "read", "title": "Read chapter 4", "estimated_minutes": 60 }
        ]
    }"#;

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &["plan", "--message", "can we do this from 3 to 5pm?"],
        Some(request),
    );
    assert_eq!(code, 0, "plan failed: {stderr}");

    let plan = parse_json(&stdout);
    assert_eq!(plan["placed"][0]["task"]["id"], "read");
    assert_eq!(plan["placed"][0]["scheduled"]["start"], "2024-01-01T15:30:00Z");
    assert_eq!(plan["event_drafts"][0]["task_id"], "read");
    assert_eq!(plan["event_drafts"][0]["title"], "Read chapter 4");
    assert_eq!(plan["event_drafts"][0]["duration_minutes"], 60);
    assert!(plan["unplaced"].as_array().unwrap().is_empty());
}

#[test]
fn test_plan_reports_unplaced_tasks() {
    let home = tempfile::tempdir().unwrap();
    let request = r#"{
        "horizon": { "start": "2024-01-01T12:00:00Z", "end": "2024-01-01T13:00:00Z" },
        "tasks": [{ "id": "big", "estimated_minutes": 240 }]
    }"#;

    let (stdout, _, code) = run_cli(home.path(), &["plan"], Some(request));
    assert_eq!(code, 0);
    let plan = parse_json(&stdout);
    assert_eq!(plan["unplaced"][0]["task"]["id"], "big");
    assert_eq!(plan["unplaced"][0]["reason"], "no_free_block_large_enough");
}

#[test]
fn test_breakdown_paper() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["breakdown", "Term paper", "--difficulty", "hard"],
        None,
    );
    assert_eq!(code, 0);
    let breakdown = parse_json(&stdout);
    assert_eq!(breakdown["kind"], "paper");
    assert_eq!(breakdown["subtasks"].as_array().unwrap().len(), 5);
    assert_eq!(breakdown["total_minutes"], 990);
}

#[test]
fn test_breakdown_rejects_unknown_difficulty() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &["breakdown", "Lab", "--difficulty", "brutal"],
        None,
    );
    assert_ne!(code, 0);
}

#[test]
fn test_parse_time() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["parse-time", "I'm free 9am-11am"], None);
    assert_eq!(code, 0);
    let expr = parse_json(&stdout);
    assert_eq!(expr["window"]["start"], "09:00");
    assert_eq!(expr["window"]["end"], "11:00");
    assert_eq!(expr["confidence"], "high");

    let (_, stderr, code) = run_cli(home.path(), &["parse-time", "whenever"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("no time expression"));
}

#[test]
fn test_config_roundtrip() {
    let home = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "study.min_session_minutes"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "study.min_session_minutes", "30"], None);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "study.min_session_minutes"], None);
    assert_eq!(stdout.trim(), "30");
    assert!(home.path().join("config.toml").exists());

    let (stdout, _, code) = run_cli(home.path(), &["config", "list"], None);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["study"]["min_session_minutes"], 30);

    let (_, _, code) = run_cli(home.path(), &["config", "reset"], None);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "study.min_session_minutes"], None);
    assert_eq!(stdout.trim(), "45");
}

#[test]
fn test_config_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "study.nope"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "study.nope", "1"], None);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}
