use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn init_writes_template() {
  let env = TestEnv::empty();

  env
    .runpack_cmd()
    .args(["init", "app"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Initialized runpack configuration"));

  let content = std::fs::read_to_string(env.root().join("app/runpack.toml")).unwrap();
  assert!(content.contains("[installer]"));
  assert!(!content.contains("{upgrade_uuid}"));
}

#[test]
fn init_template_without_dependency_dir_fails_planning() {
  let env = TestEnv::empty();
  env.runpack_cmd().arg("init").assert().success();

  env
    .runpack_cmd()
    .args(["plan", "--until", "stage"])
    .assert()
    .code(74)
    .stderr(predicate::str::contains("failed to read dependency directory"));
}

#[test]
fn init_refuses_existing_config() {
  let env = TestEnv::project();

  env
    .runpack_cmd()
    .arg("init")
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_template_is_accepted_by_plan() {
  let env = TestEnv::empty();
  env.runpack_cmd().arg("init").assert().success();
  std::fs::create_dir_all(env.root().join("build/dependencies")).unwrap();

  env
    .runpack_cmd()
    .args(["plan", "--until", "stage"])
    .assert()
    .success()
    .stdout(predicate::str::contains("myapp-1.0.0.jar"));
}
