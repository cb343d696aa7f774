//! CLI smoke tests for runpack.
//!
//! These tests verify that the commands parse, run without panicking and
//! return the documented exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the runpack binary.
fn runpack_cmd() -> Command {
  cargo_bin_cmd!("runpack")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  runpack_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  runpack_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("runpack"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["stage", "runtime", "installer", "plan", "clean", "init", "info"] {
    runpack_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn step_aliases_are_accepted() {
  for alias in &["synthesize-runtime", "build-installer", "package"] {
    runpack_cmd()
      .arg(alias)
      .arg("--help")
      .assert()
      .success();
  }
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_shows_platform() {
  runpack_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Platform:"))
    .stdout(predicate::str::contains("Packaging:"));
}

#[test]
fn info_json_is_parseable() {
  let output = runpack_cmd().args(["-o", "json", "info"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["packaging_os"], "windows");
}

// =============================================================================
// configuration errors
// =============================================================================

#[test]
fn missing_config_exits_with_config_code() {
  let temp = TempDir::new().unwrap();

  runpack_cmd()
    .current_dir(temp.path())
    .arg("stage")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn invalid_config_exits_with_config_code() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("runpack.toml"), "[app]\nname = \"x\"\n").unwrap();

  runpack_cmd()
    .current_dir(temp.path())
    .arg("plan")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn unknown_subcommand_fails() {
  runpack_cmd().arg("deploy").assert().failure();
}
