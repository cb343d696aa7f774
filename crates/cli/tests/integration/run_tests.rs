use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn stage_copies_artifacts_into_input_dir() {
  let env = TestEnv::project();

  env
    .runpack_cmd()
    .arg("stage")
    .assert()
    .success()
    .stdout(predicate::str::contains("Staged 4 file(s)"));

  let input = env.root().join("build/jpackage/input");
  for name in ["xclip-1.0.0.jar", "gson-2.11.0.jar", "javafx-base-21-win.jar", "javafx-controls-21-win.jar"] {
    assert!(input.join(name).exists(), "{name} should be staged");
  }
}

#[test]
fn stage_twice_replaces_previous_staging() {
  let env = TestEnv::project();
  env.runpack_cmd().arg("stage").assert().success();

  std::fs::remove_file(env.root().join("deps/gson-2.11.0.jar")).unwrap();
  env.runpack_cmd().arg("stage").assert().success();

  let input = env.root().join("build/jpackage/input");
  assert!(!input.join("gson-2.11.0.jar").exists());
  assert_eq!(std::fs::read_dir(&input).unwrap().count(), 3);
}

#[test]
fn stage_json_reports_state() {
  let env = TestEnv::project();

  let output = env.runpack_cmd().args(["--output", "json", "stage"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["state"]["state"], "staged");
  assert_eq!(report["steps"][0]["outcome"]["step"], "staged");
  assert_eq!(report["steps"][0]["outcome"]["files"].as_array().unwrap().len(), 4);
}

#[test]
fn missing_main_artifact_exits_with_io_code() {
  let env = TestEnv::project();
  std::fs::remove_file(env.root().join("build/libs/xclip-1.0.0.jar")).unwrap();

  env
    .runpack_cmd()
    .arg("stage")
    .assert()
    .code(74)
    .stderr(predicate::str::contains("stage failed"));
}

#[test]
fn duplicate_artifact_names_exit_with_config_code() {
  let env = TestEnv::project();
  env.write_file("deps/XCLIP-1.0.0.JAR", "imposter");

  env
    .runpack_cmd()
    .arg("stage")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("is used by both"));
}

#[cfg(not(windows))]
#[test]
fn runtime_refuses_non_windows_host() {
  let env = TestEnv::project();
  env.install_toolchain();

  env
    .runpack_cmd()
    .arg("runtime")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("synthesize-runtime is only supported on windows hosts"));

  assert!(env.root().join("build/jpackage/input").exists());
  assert!(!env.root().join("build/runtime").exists());
}

#[cfg(not(windows))]
#[test]
fn installer_alias_stops_at_runtime_step_on_non_windows_host() {
  let env = TestEnv::project();
  env.install_toolchain();

  env
    .runpack_cmd()
    .arg("build-installer")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("synthesize-runtime"));

  assert!(!env.root().join("build/installer").exists());
}
