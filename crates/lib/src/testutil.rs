//! Test helpers for runpack-lib.
//!
//! Fake tools are tiny `/bin/sh` scripts that record how they were invoked into
//! files next to the fake toolchain home, so tests can assert on argument vectors,
//! the inherited `PATH`, and the number of invocations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::os::Os;
use crate::process::ToolCommand;
use crate::toolchain::{INSTALLER_TOOL, LINKER_TOOL, Toolchain};

/// Returns a command running `script` through `/bin/sh`.
#[cfg(unix)]
pub fn shell_tool(script: &str) -> ToolCommand {
  ToolCommand::new("sh", "/bin/sh").args(["-c", script])
}

/// Write an executable `/bin/sh` script at `path`.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
  use std::os::unix::fs::PermissionsExt;

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A toolchain home populated with fake `jlink.exe` / `jpackage.exe` scripts.
///
/// Tool names carry the Windows suffix because tests drive the pipeline with the
/// host injected as Windows.
pub struct FakeToolchain {
  pub home: PathBuf,
}

impl FakeToolchain {
  /// Empty toolchain home: `bin/` and `jmods/` exist, no tools yet.
  pub fn new(root: &Path) -> Self {
    let home = root.join("jdk");
    fs::create_dir_all(home.join("bin")).unwrap();
    fs::create_dir_all(home.join("jmods")).unwrap();
    Self { home }
  }

  pub fn toolchain(&self) -> Toolchain {
    Toolchain::new(&self.home)
  }

  /// Install a fake linker that creates the `--output` directory and exits with `code`.
  /// A failing linker still leaves a partial `--output/bin` behind.
  #[cfg(unix)]
  pub fn with_linker(self, code: i32) -> Self {
    let body = format!(
      r#"echo call >> '{calls}'
printf '%s\n' "$@" > '{args}'
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
echo "linking runtime image"
mkdir -p "$out/bin"
if [ {code} -ne 0 ]; then echo "linker error" >&2; exit {code}; fi
echo "image" > "$out/release"
"#,
      calls = self.record(LINKER_TOOL, "calls").display(),
      args = self.record(LINKER_TOOL, "args").display(),
      code = code,
    );
    write_script(&self.toolchain().linker(Os::Windows), &body);
    self
  }

  /// Install a fake installer generator that writes `<name>-<version>.<type>` into
  /// `--dest` and exits with `code`. Each run appends a line, so a rebuilt package
  /// changes length even when the filesystem clock is coarse.
  #[cfg(unix)]
  pub fn with_installer(self, code: i32) -> Self {
    let body = format!(
      r#"echo call >> '{calls}'
printf '%s\n' "$@" > '{args}'
echo "$PATH" > '{path}'
dest=""; name=""; version=""; kind=""
while [ $# -gt 0 ]; do
  case "$1" in
    --dest) dest="$2" ;;
    --name) name="$2" ;;
    --app-version) version="$2" ;;
    --type) kind="$2" ;;
  esac
  shift
done
echo "packaging $name"
if [ {code} -ne 0 ]; then echo "installer error" >&2; exit {code}; fi
echo "package" >> "$dest/$name-$version.$kind"
"#,
      calls = self.record(INSTALLER_TOOL, "calls").display(),
      args = self.record(INSTALLER_TOOL, "args").display(),
      path = self.record(INSTALLER_TOOL, "path").display(),
      code = code,
    );
    write_script(&self.toolchain().installer_generator(Os::Windows), &body);
    self
  }

  /// Number of times `tool` was invoked.
  pub fn calls(&self, tool: &str) -> usize {
    fs::read_to_string(self.record(tool, "calls"))
      .map(|s| s.lines().count())
      .unwrap_or(0)
  }

  /// Argument vector of the last invocation of `tool`.
  pub fn args(&self, tool: &str) -> Vec<String> {
    fs::read_to_string(self.record(tool, "args"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// `PATH` seen by the last installer generator invocation.
  pub fn installer_path_env(&self) -> String {
    fs::read_to_string(self.record(INSTALLER_TOOL, "path"))
      .unwrap_or_default()
      .trim_end()
      .to_string()
  }

  fn record(&self, tool: &str, kind: &str) -> PathBuf {
    self.home.join(format!("{}.{}", tool, kind))
  }
}

/// Value following `flag` in an argument vector.
pub fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
  args
    .iter()
    .position(|a| a == flag)
    .and_then(|i| args.get(i + 1))
    .map(String::as_str)
}
