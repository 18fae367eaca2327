//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify its outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use chrono::{Duration, Utc};
use focusward_core::storage::{Database, SessionStore};
use focusward_core::SessionRecord;
use tempfile::TempDir;

/// Run a CLI command with `stdin` piped in and return (stdout, stderr, code).
fn run_cli_with_input(data_dir: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusward"))
        .args(args)
        .env("FOCUSWARD_DATA_DIR", data_dir)
        .env_remove("FOCUSWARD_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_cli_with_input(data_dir, args, "")
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command {args:?} failed: {stderr}");
    stdout
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse JSON line"))
        .collect()
}

fn event_types(events: &[serde_json::Value]) -> Vec<&str> {
    events.iter().filter_map(|e| e["type"].as_str()).collect()
}

fn seed_sessions(data_dir: &Path, records: Vec<SessionRecord>) {
    let db = Database::open_at(&data_dir.join("focusward.db")).unwrap();
    let store = SessionStore::load(db);
    for record in records {
        store.append_and_persist(record);
    }
}

fn record(category: &str, minutes_ago: i64, secs: i64, distractions: u32) -> SessionRecord {
    let started = Utc::now() - Duration::minutes(minutes_ago);
    SessionRecord::new(
        category,
        1_500,
        distractions,
        started,
        started + Duration::seconds(secs),
    )
}

#[test]
fn test_stats_empty_history() {
    let dir = TempDir::new().unwrap();
    let stdout = run_cli_success(dir.path(), &["stats"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["range"], "last-7-days");
    assert_eq!(report["session_count"], 0);
    assert_eq!(report["average_session_secs"], 0.0);
    assert_eq!(report["daily_minutes"].as_array().unwrap().len(), 7);
}

#[test]
fn test_stats_all_counts_seeded_sessions() {
    let dir = TempDir::new().unwrap();
    seed_sessions(
        dir.path(),
        vec![
            record("Coding", 600, 1_500, 2),
            record("Reading", 120, 900, 0),
        ],
    );

    let stdout = run_cli_success(dir.path(), &["stats", "--range", "all"]);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["range"], "all");
    assert_eq!(report["session_count"], 2);
    assert_eq!(report["total_secs"], 2_400);
    assert_eq!(report["total_distractions"], 2);
    assert_eq!(report["all_time_total_secs"], 2_400);

    // Newest first, so Reading is seen before Coding.
    let categories: Vec<&str> = report["category_minutes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Reading", "Coding"]);
}

#[test]
fn test_stats_summary_and_bad_range() {
    let dir = TempDir::new().unwrap();
    seed_sessions(dir.path(), vec![record("Coding", 90, 3_900, 0)]);

    let stdout = run_cli_success(dir.path(), &["stats", "--range", "all", "--summary"]);
    assert!(stdout.contains("sessions: 1"));
    assert!(stdout.contains("all time: 1 h 5 min"));

    let (_, stderr, code) = run_cli(dir.path(), &["stats", "--range", "yesterday"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("yesterday"));
}

#[test]
fn test_sessions_list_newest_first_with_limit() {
    let dir = TempDir::new().unwrap();
    seed_sessions(
        dir.path(),
        vec![
            record("Coding", 300, 1_500, 0),
            record("Project", 200, 1_200, 1),
            record("Reading", 100, 600, 0),
        ],
    );

    let stdout = run_cli_success(dir.path(), &["sessions", "list"]);
    let sessions: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0]["category"], "Reading");
    assert_eq!(sessions[2]["category"], "Coding");
    assert_eq!(sessions[1]["targetDurationSec"], 1_500);
    assert_eq!(sessions[1]["distractionCount"], 1);

    let stdout = run_cli_success(dir.path(), &["sessions", "list", "--limit", "1"]);
    let sessions: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["category"], "Reading");
}

#[test]
fn test_config_get_set_reset() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "timer.default_minutes"]).trim(),
        "25"
    );

    run_cli_success(dir.path(), &["config", "set", "timer.default_minutes", "50"]);
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "timer.default_minutes"]).trim(),
        "50"
    );
    assert!(dir.path().join("config.toml").exists());

    let listed = run_cli_success(dir.path(), &["config", "list"]);
    let config: serde_json::Value = serde_json::from_str(&listed).unwrap();
    assert_eq!(config["categories"]["default"], "Studying");

    run_cli_success(dir.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "timer.default_minutes"]).trim(),
        "25"
    );
}

#[test]
fn test_config_rejects_unknown_key_and_zero_minutes() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "ui.dark_mode"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.default_minutes", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn test_run_background_pauses_and_counts_distraction() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli_with_input(
        dir.path(),
        &["run", "--minutes", "25", "--category", "coding"],
        "start\nbg\nfg\nstatus\nquit\n",
    );
    assert_eq!(code, 0, "run failed: {stderr}");

    let events = json_lines(&stdout);
    assert_eq!(
        event_types(&events),
        vec![
            "state_snapshot",
            "timer_started",
            "lifecycle_changed",
            "timer_paused",
            "lifecycle_changed",
            "state_snapshot",
            "timer_reset",
        ]
    );

    assert_eq!(events[0]["phase"], "idle");
    assert_eq!(events[0]["clock"], "25:00");
    assert_eq!(events[0]["category"], "Coding");
    assert_eq!(events[1]["resumed"], false);
    assert_eq!(events[3]["caused_by_background"], true);
    assert_eq!(events[3]["distraction_count"], 1);
    assert_eq!(events[5]["phase"], "paused");
    assert_eq!(events[5]["distraction_count"], 1);

    // Abandoned on quit, so nothing was recorded.
    let stored = run_cli_success(dir.path(), &["sessions", "list"]);
    let sessions: Vec<serde_json::Value> = serde_json::from_str(&stored).unwrap();
    assert!(sessions.is_empty());
}

#[test]
fn test_run_manual_pause_is_not_a_distraction() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) =
        run_cli_with_input(dir.path(), &["run", "--start"], "pause\nbg\nstatus\n");
    assert_eq!(code, 0);

    let events = json_lines(&stdout);
    let paused = events
        .iter()
        .find(|e| e["type"] == "timer_paused")
        .expect("pause event");
    assert_eq!(paused["caused_by_background"], false);

    let status = events
        .iter()
        .rev()
        .find(|e| e["type"] == "state_snapshot")
        .unwrap();
    assert_eq!(status["distraction_count"], 0);
}

#[test]
fn test_run_reports_command_errors_inline() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli_with_input(
        dir.path(),
        &["run"],
        "minutes abc\nstart\ncategory Gaming\njump\nack\nquit\n",
    );
    assert_eq!(code, 0);

    let events = json_lines(&stdout);
    let configured = events
        .iter()
        .find(|e| e["type"] == "target_configured")
        .unwrap();
    assert_eq!(configured["remaining_secs"], 0);

    let errors: Vec<&str> = events
        .iter()
        .filter(|e| e["type"] == "error")
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(errors.len(), 4);
    assert!(errors[0].contains("Invalid duration"));
    assert!(errors[1].contains("Unknown category 'Gaming'"));
    assert!(errors[2].contains("unknown command: jump"));
    assert!(!events.iter().any(|e| e["type"] == "timer_started"));
}

#[test]
fn test_run_start_flag_rejects_invalid_minutes() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["run", "--minutes", "0", "--start"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid duration '0'"));
}

#[test]
fn test_run_rejects_unknown_category() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["run", "--category", "Gaming"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown category 'Gaming'"));
}

#[test]
fn test_completions_generate_script() {
    let dir = TempDir::new().unwrap();
    let stdout = run_cli_success(dir.path(), &["completions", "bash"]);
    assert!(stdout.contains("focusward"));
}
