//! Integration tests for the kilowatt binary
//!
//! Each run gets an empty config directory and static mode, so results come
//! from the bundled fixtures.

use std::process::{Command, Output};

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> Output {
    run_cli_with_env(args, &[])
}

fn run_cli_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let config_home = tempfile::tempdir().expect("Failed to create temp dir");
    Command::new(env!("CARGO_BIN_EXE_kilowatt"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env("KILOWATT_USE_BACKEND_API", "false")
        .env_remove("KILOWATT_FIXTURE_DIR")
        .env_remove("RUST_LOG")
        .envs(env.iter().copied())
        .output()
        .expect("Failed to execute kilowatt")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kilowatt"), "Help should mention kilowatt");
    assert!(stdout.contains("list"), "Help should mention the list command");
    assert!(stdout.contains("--backend"), "Help should mention --backend");
}

#[test]
fn test_list_accounts_from_bundled_fixtures() {
    let output = run_cli(&["list", "accounts", "--show-source"]);
    assert!(
        output.status.success(),
        "list accounts failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Oak Ridge HOA"));
    assert_eq!(stdout_json(&output).as_array().map(Vec::len), Some(3));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("source: fallback"), "stderr was: {}", stderr);
}

#[test]
fn test_list_with_param_filters_fixture_rows() {
    let output = run_cli(&["list", "accounts", "--param", "status=Inactive"]);
    assert!(output.status.success());
    let rows = stdout_json(&output);
    let rows = rows.as_array().expect("list output should be an array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "Inactive");
}

#[test]
fn test_invalid_env_value_is_logged() {
    let output = run_cli_with_env(&["config"], &[("KILOWATT_API_TIMEOUT_MS", "soon")]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Ignoring invalid environment value"),
        "config warning should reach stderr: {}",
        stderr
    );
}

#[test]
fn test_unknown_resource_fails() {
    let output = run_cli(&["list", "tasks"]);
    assert!(!output.status.success(), "Expected unknown resource to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown resource"),
        "Should explain the resource is unknown: {}",
        stderr
    );
}

#[test]
fn test_show_missing_record_fails() {
    let output = run_cli(&["show", "accounts", "999"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr was: {}", stderr);
}

#[test]
fn test_esiids_for_account() {
    let output = run_cli(&["esiids-for", "1"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output).as_array().map(Vec::len), Some(2));
}

#[test]
fn test_commission_stats() {
    let output = run_cli(&["stats", "commissions"]);
    assert!(output.status.success());
    let stats = stdout_json(&output);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["totalAmount"].as_f64(), Some(1800.0));
}

#[test]
fn test_health_in_static_mode() {
    let output = run_cli(&["health"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["system"]["status"], "static");
}
