//! End-to-end tests of the `vagent` binary for commands that need no model.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn vagent(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vagent"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("VAGENT_MODEL")
        .env_remove("VAGENT_THINKING")
        .env_remove("VAGENT_WORKSPACE")
        .env_remove("VAGENT_CATALOG")
        .env_remove("OPENROUTER_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_models_lists_catalogue() {
    let home = tempfile::tempdir().unwrap();
    let output = vagent(home.path()).arg("models").output().unwrap();

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("claude-sonnet-4.5"));
    assert!(out.contains("o4-mini"));
}

#[test]
fn test_shell_runs_commands_against_workspace() {
    let home = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    std::fs::write(workspace.path().join("notes.md"), "hello\nworld\n").unwrap();

    let mut cmd = vagent(home.path());
    cmd.arg("shell").arg("--workspace").arg(workspace.path());
    let output = run_with_stdin(cmd, "pwd\nls\ngrep world\ncat missing.md\nfrobnicate\n");

    assert!(output.status.success());
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "/home/user");
    assert_eq!(lines[1], "notes.md");
    assert_eq!(lines[2], "/home/user/notes.md:2:world");
    assert!(lines[3].starts_with("Error:"));
    assert!(lines[3].contains("does not exist"));
    assert!(lines[4].contains("not implemented"));
}

#[test]
fn test_shell_sync_writes_back() {
    let home = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();

    let mut cmd = vagent(home.path());
    cmd.arg("shell")
        .arg("--workspace")
        .arg(workspace.path())
        .arg("--sync");
    let output = run_with_stdin(cmd, "mkdir docs\necho draft > docs/plan.md\nexit\n");

    assert!(output.status.success());
    let saved = std::fs::read_to_string(workspace.path().join("docs/plan.md")).unwrap();
    assert_eq!(saved, "draft");
    assert!(!workspace.path().join("docs/.dir").exists());
}

#[test]
fn test_config_set_and_get() {
    let home = tempfile::tempdir().unwrap();

    let output = vagent(home.path())
        .args(["config", "set", "model", "gpt-4.1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "model = gpt-4.1");

    let output = vagent(home.path())
        .args(["config", "get", "model"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output).trim(), "gpt-4.1");

    let output = vagent(home.path())
        .args(["config", "get", "catalog"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output).trim(), "(unset)");
}

#[test]
fn test_config_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let output = vagent(home.path())
        .args(["config", "set", "colour", "blue"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("unknown setting"));
}

#[test]
fn test_run_without_api_key_fails_before_running() {
    let home = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let output = vagent(home.path())
        .arg("run")
        .arg("--workspace")
        .arg(workspace.path())
        .arg("hello")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("Missing API key"));
}
