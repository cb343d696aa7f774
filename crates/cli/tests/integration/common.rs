//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Configuration used by most tests. Paths are relative to the project directory.
pub const PROJECT_CONFIG: &str = r#"
[app]
name = "XClip"
vendor = "XCON X-SERIES"
version = "1.0.0"
main_class = "io.xseries.xclip.XClipApp"
icon = "src/main/resources/icons/app.ico"
upgrade_uuid = "1322455b-12c4-4363-b896-12cd27ac3e3d"

[artifacts]
main = "build/libs/xclip-1.0.0.jar"
dependency_dirs = ["deps"]

[toolchain]
home = "jdk"
"#;

/// Isolated project directory.
///
/// Each test gets its own temporary directory holding `runpack.toml`, a main
/// artifact, a dependency directory and an icon.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project with the default configuration and artifacts.
  pub fn project() -> Self {
    let env = Self::empty();
    env.write_file("runpack.toml", PROJECT_CONFIG);
    env.write_file("build/libs/xclip-1.0.0.jar", "main");
    env.write_file("deps/gson-2.11.0.jar", "gson");
    env.write_file("deps/javafx-base-21-win.jar", "fx-base");
    env.write_file("deps/javafx-controls-21-win.jar", "fx-controls");
    env.write_file("src/main/resources/icons/app.ico", "icon");
    env
  }

  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Project root, canonicalized the way config loading anchors paths.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Place empty `jlink.exe` / `jpackage.exe` files and a module repository under `jdk/`.
  ///
  /// The files are never executed; they only satisfy the existence checks.
  pub fn install_toolchain(&self) {
    self.write_file("jdk/bin/jlink.exe", "");
    self.write_file("jdk/bin/jpackage.exe", "");
    std::fs::create_dir_all(self.temp.path().join("jdk/jmods")).unwrap();
  }

  /// Get a Command for the runpack binary, run from the project directory.
  pub fn runpack_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("runpack");
    cmd.current_dir(self.temp.path());
    cmd.env_remove("RUNPACK_TOOLCHAIN_HOME");
    cmd.env_remove("JAVA_HOME");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
