//! CLI smoke tests: verify basic binary behavior.

use std::io::Write;
use std::process::{Command, Stdio};

fn cli_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reverie"));
    cmd.env_remove("REVERIE_CONFIG")
        .env_remove("REVERIE_STAMINA_MAX")
        .env_remove("REVERIE_STAMINA_LOW_THRESHOLD")
        .env("RUST_LOG", "warn");
    cmd
}

fn run_with_stdin(input: &str) -> std::process::Output {
    let mut child = cli_bin()
        .arg("--config")
        .arg("/tmp/nonexistent_reverie_config_12345.toml")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait")
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage"),
        "Expected usage info in --help output"
    );
    assert!(stdout.contains("--log-json"));
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("reverie_cli"),
        "Expected crate name in --version output"
    );
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    // Empty stdin: the agent starts on defaults and exits at EOF
    let output = run_with_stdin("");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_mention_prints_a_decision() {
    let event = r#"{"id":"m1","author_id":"alice","channel_id":"general","content":"hey, thanks!","timestamp":"2024-05-01T12:00:00Z","mentions_agent":true}"#;
    let output = run_with_stdin(&format!("{event}\n"));
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().expect("one decision line");
    let decision: serde_json::Value = serde_json::from_str(line).expect("decision is JSON");
    assert_eq!(decision["message_id"], "m1");
    assert_eq!(decision["respond"], true);
    assert_eq!(decision["deferred"], false);
}

#[test]
fn test_malformed_line_is_skipped() {
    let event = r#"{"id":"m2","author_id":"bob","channel_id":"dm-bob","content":"hi","timestamp":"2024-05-01T12:00:00Z","is_direct":true}"#;
    let output = run_with_stdin(&format!("not json\n\n{event}\n"));
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("\"m2\""));
}
