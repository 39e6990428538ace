//! Integration tests for the tripplanner CLI
//!
//! None of these reach the network: every case fails or finishes before the
//! first HTTP request.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

fn no_config() -> PathBuf {
    std::env::temp_dir().join("tripplanner-tests-no-such-config.toml")
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tripplanner"))
        .arg("--config")
        .arg(no_config())
        .args(args)
        .env_remove("GOOGLE_API_KEY")
        .env_remove("TRIPPLANNER_PLANNER__API_KEY")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute tripplanner")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("tripplanner"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_plan_help_lists_options() {
    let output = run(&["plan", "--help"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    for flag in ["--start", "--end", "--days", "--budget", "--interests", "--pace", "--format", "--map"] {
        assert!(stdout.contains(flag), "missing {flag} in:\n{stdout}");
    }
}

#[test]
fn test_no_command_prints_hint() {
    let output = run(&[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("tripplanner plan --help"));
}

#[test]
fn test_end_before_start_is_invalid_input() {
    let output = run(&[
        "plan", "Paris", "--start", "2025-06-05", "--end", "2025-06-02", "--budget", "1200",
    ]);
    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("Invalid input"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("before start date"));
}

#[test]
fn test_zero_days_is_invalid_input() {
    let output = run(&["plan", "Paris", "--start", "2025-06-02", "--days", "0", "--budget", "500"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid input"));
}

#[test]
fn test_negative_budget_is_invalid_input() {
    let output = run(&["plan", "Paris", "--start", "2025-06-02", "--days", "2", "--budget=-50"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Budget must be a positive amount"));
}

#[test]
fn test_unknown_pace_is_rejected() {
    let output = run(&[
        "plan", "Paris", "--start", "2025-06-02", "--budget", "500", "--pace", "frantic",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("relaxed, moderate, packed"));
}

#[test]
fn test_malformed_date_is_rejected() {
    let output = run(&["plan", "Paris", "--start", "June 2nd", "--budget", "500"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--start"));
}

#[test]
fn test_config_command_masks_api_key() {
    let output = Command::new(env!("CARGO_BIN_EXE_tripplanner"))
        .arg("--config")
        .arg(no_config())
        .arg("config")
        .env_remove("TRIPPLANNER_PLANNER__API_KEY")
        .env("GOOGLE_API_KEY", "AIzaSyExample1234")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute tripplanner");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("nominatim.openstreetmap.org"));
    assert!(stdout.contains("****1234"));
    assert!(!stdout.contains("AIzaSyExample1234"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[logging]\nlevel = \"loud\"").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tripplanner"))
        .arg("--config")
        .arg(file.path())
        .arg("config")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute tripplanner");

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("Configuration error"));
    assert!(stderr.contains("Invalid log level"));
}
