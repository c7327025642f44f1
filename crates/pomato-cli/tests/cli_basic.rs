//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. All
//! commands run against the dev data directory (POMATO_ENV=dev).

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "pomato-cli", "--"])
        .args(args)
        .env("POMATO_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_timer_status() {
    let (stdout, _, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "Timer status failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["type"], "StateSnapshot");
    assert!(json["clock"].is_string());
}

#[test]
fn test_timer_work_then_reset() {
    let (stdout, _, code) = run_cli(&["timer", "work"]);
    assert_eq!(code, 0, "Timer work failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["type"], "WorkStarted");

    let (stdout, _, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "Timer reset failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["type"], "SessionReset");
}

#[test]
fn test_timer_rest_long() {
    let (stdout, _, code) = run_cli(&["timer", "rest", "--long"]);
    assert_eq!(code, 0, "Timer rest failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["type"], "RestStarted");
    assert_eq!(json["long"], true);
    let _ = run_cli(&["timer", "reset"]);
}

#[test]
fn test_timer_toggle() {
    let (_, _, code) = run_cli(&["timer", "toggle"]);
    assert_eq!(code, 0, "Timer toggle failed");
}

#[test]
fn test_config_get() {
    let (stdout, _, code) = run_cli(&["config", "get", "durations.work_secs"]);
    assert_eq!(code, 0, "Config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, _, code) = run_cli(&["config", "get", "durations.nope"]);
    assert_ne!(code, 0, "Config get of unknown key succeeded");
}

#[test]
fn test_config_set_and_list() {
    let (_, _, code) = run_cli(&["config", "set", "notifications.enabled", "true"]);
    assert_eq!(code, 0, "Config set failed");

    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "Config list failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json["durations"].is_object());
}

#[test]
fn test_stats_show() {
    let (stdout, _, code) = run_cli(&["stats", "show"]);
    assert_eq!(code, 0, "Stats show failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json["pomodoros_completed"].is_u64());
}

#[test]
fn test_stats_reset() {
    let (stdout, _, code) = run_cli(&["stats", "reset"]);
    assert_eq!(code, 0, "Stats reset failed");
    assert!(stdout.contains("stats reset"));
}
