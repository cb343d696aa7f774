use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_prints_commands_without_writing() {
  let env = TestEnv::project();
  env.install_toolchain();

  env
    .runpack_cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("--add-modules"))
    .stdout(predicate::str::contains("javafx.controls"))
    .stdout(predicate::str::contains("--win-upgrade-uuid"))
    .stdout(predicate::str::contains("xclip-1.0.0.jar"));

  assert!(!env.root().join("build/jpackage").exists());
  assert!(!env.root().join("build/runtime").exists());
}

#[test]
fn plan_reports_existing_runtime_image() {
  let env = TestEnv::project();
  env.install_toolchain();
  std::fs::create_dir_all(env.root().join("build/runtime/1.0.0")).unwrap();

  env
    .runpack_cmd()
    .args(["plan", "--until", "runtime"])
    .assert()
    .success()
    .stdout(predicate::str::contains("linker would not run"))
    .stdout(predicate::str::contains("Build installer").not());
}

#[test]
fn plan_json_lists_modules() {
  let env = TestEnv::project();
  env.install_toolchain();

  let output = env.runpack_cmd().args(["-o", "json", "plan"]).output().unwrap();
  assert!(output.status.success());

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let modules: Vec<_> = plan["runtime"]["modules"]
    .as_array()
    .unwrap()
    .iter()
    .map(|m| m.as_str().unwrap().to_string())
    .collect();
  assert_eq!(modules[0], "java.base");
  assert!(modules.contains(&"javafx.base".to_string()));
  assert_eq!(plan["target"], "build_installer");
}

#[test]
fn plan_without_linker_names_expected_path() {
  let env = TestEnv::project();
  std::fs::create_dir_all(env.root().join("jdk/jmods")).unwrap();

  env
    .runpack_cmd()
    .arg("plan")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("module linker not found"))
    .stderr(predicate::str::contains("jlink.exe"));
}

#[test]
fn plan_without_icon_fails_at_installer() {
  let env = TestEnv::project();
  env.install_toolchain();
  std::fs::remove_file(env.root().join("src/main/resources/icons/app.ico")).unwrap();

  env
    .runpack_cmd()
    .arg("plan")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("build-installer failed"))
    .stderr(predicate::str::contains("icon not found"));
}
