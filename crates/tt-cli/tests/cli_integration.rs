//! Integration tests for the `tt` binary.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};

/// Runs `tt` with an isolated config directory and no token in the environment.
fn run_tt(config: Option<&NamedTempFile>, args: &[&str]) -> Output {
    let config_home = TempDir::new().unwrap();
    let mut command = Command::new(env!("CARGO_BIN_EXE_tt"));
    command
        .env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("TT_API_TOKEN")
        .env_remove("TT_BASE_URL");
    if let Some(config) = config {
        command.arg("--config").arg(config.path());
    }
    command.args(args).output().expect("Failed to run tt")
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{contents}").unwrap();
    file.flush().unwrap();
    file
}

/// Port 9 (discard) is not expected to accept connections.
const UNREACHABLE_CONFIG: &str = r#"
api_token = "test-token"
base_url = "http://127.0.0.1:9/api/v8"
timeout_secs = 2
"#;

#[test]
fn test_no_subcommand_prints_help() {
    let output = run_tt(None, &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("entries"), "help was: {stdout}");
    assert!(stdout.contains("check"), "help was: {stdout}");
}

#[test]
fn test_entries_without_token_fails_with_hint() {
    let output = run_tt(None, &["entries"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TT_API_TOKEN"), "stderr was: {stderr}");
}

#[test]
fn test_check_unreachable_server_fails_gracefully() {
    let config = config_file(UNREACHABLE_CONFIG);
    let output = run_tt(Some(&config), &["check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("logon failed"), "stderr was: {stderr}");
}

#[test]
fn test_echo_log_reports_client_messages() {
    let config = config_file(UNREACHABLE_CONFIG);
    let output = run_tt(Some(&config), &["--echo-log", "debug", "entries"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[debug] Logging on"), "stderr was: {stderr}");
    assert!(stderr.contains("[error] Logon failed"), "stderr was: {stderr}");
}

#[test]
fn test_invalid_start_is_rejected() {
    let config = config_file(UNREACHABLE_CONFIG);
    let output = run_tt(Some(&config), &["entries", "--start", "someday"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid datetime"), "stderr was: {stderr}");
}
