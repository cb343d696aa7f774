use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn clean_runtime_keeps_staging() {
  let env = TestEnv::project();
  env.runpack_cmd().arg("stage").assert().success();
  std::fs::create_dir_all(env.root().join("build/runtime/1.0.0/bin")).unwrap();

  env
    .runpack_cmd()
    .args(["clean", "--runtime"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Clean complete"));

  assert!(!env.root().join("build/runtime").exists());
  assert!(env.root().join("build/jpackage/input").exists());
}

#[test]
fn clean_without_flags_removes_everything() {
  let env = TestEnv::project();
  env.runpack_cmd().arg("stage").assert().success();
  std::fs::create_dir_all(env.root().join("build/runtime/1.0.0")).unwrap();
  std::fs::create_dir_all(env.root().join("build/installer")).unwrap();

  env.runpack_cmd().arg("clean").assert().success();

  assert!(!env.root().join("build/jpackage/input").exists());
  assert!(!env.root().join("build/runtime").exists());
  assert!(!env.root().join("build/installer").exists());
}

#[test]
fn clean_dry_run_keeps_files() {
  let env = TestEnv::project();
  env.runpack_cmd().arg("stage").assert().success();

  env
    .runpack_cmd()
    .args(["clean", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Dry run"));

  assert!(env.root().join("build/jpackage/input").exists());
}
