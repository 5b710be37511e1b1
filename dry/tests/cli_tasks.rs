//! CLI tests for `dry` task dispatch.
//!
//! Spawns the dry binary against scratch workspaces and checks exit codes and
//! the workspace state left behind. Only tasks that never reach an external
//! tool are exercised here.

use std::process::{Command, Output};

use dry::exit_codes;
use dry::io::env::SERVICE_PRINCIPAL_VARS;
use dry::test_support::TestWorkspace;

fn dry(ws: &TestWorkspace, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dry"));
    cmd.arg("--root").arg(ws.path()).args(args);
    for key in SERVICE_PRINCIPAL_VARS {
        cmd.env_remove(key);
    }
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("run dry")
}

#[test]
fn clean_removes_artifacts_and_exits_ok() {
    let ws = TestWorkspace::new().expect("workspace");
    let state = ws.touch("terraform.tfstate").expect("touch");
    let cache = ws.touch(".terraform/modules/modules.json").expect("touch");
    let vendored = ws.touch("vendor/terraform.tfstate").expect("touch");

    let output = dry(&ws, &["clean"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(!state.exists());
    assert!(!cache.exists());
    assert!(vendored.exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cleaning..."));
    assert!(stdout.contains("Removed 'terraform.tfstate'"));
}

#[test]
fn clean_twice_is_idempotent() {
    let ws = TestWorkspace::new().expect("workspace");
    ws.touch("coverage.2024-01-01T00:00:00Z.out").expect("touch");

    assert_eq!(dry(&ws, &["clean"]).status.code(), Some(exit_codes::OK));
    let second = dry(&ws, &["clean"]);

    assert_eq!(second.status.code(), Some(exit_codes::OK));
    assert!(!String::from_utf8_lossy(&second.stdout).contains("Removed"));
}

#[test]
fn default_task_without_test_dir_is_nothing_to_do() {
    let ws = TestWorkspace::new().expect("workspace");
    let state = ws.touch("terraform.tfstate").expect("touch");

    let output = dry(&ws, &[]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(
        String::from_utf8_lossy(&output.stdout)
            .contains("Test directory './test/' does not exist.")
    );
    assert!(state.exists());
}

#[test]
fn select_sandbox_without_target_fails() {
    let ws = TestWorkspace::new().expect("workspace");

    let output = dry(&ws, &["select-sandbox"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("sandbox.account_name"));
}

#[test]
fn invalid_config_fails_before_any_task() {
    let ws = TestWorkspace::new().expect("workspace");
    ws.write("dry.toml", "test_dir = \"\"\n").expect("write");
    let state = ws.touch("terraform.tfstate").expect("touch");

    let output = dry(&ws, &["clean"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("test_dir must not be empty"));
    assert!(state.exists());
}
