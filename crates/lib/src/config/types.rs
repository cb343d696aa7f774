//! Configuration model for `runpack.toml`.
//!
//! Every section maps to one concern of the packaging pipeline. Paths are kept as
//! written until [`PackConfig::resolve_paths`] anchors them to the directory that
//! holds the configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Launch options passed to the packaged application when none are configured.
pub const DEFAULT_LAUNCH_OPTIONS: [&str; 4] = ["-Xms64m", "-Xmx512m", "-Xss512k", "-Dfile.encoding=UTF-8"];

/// Runtime modules bundled when none are configured.
pub const DEFAULT_RUNTIME_MODULES: [&str; 5] = ["java.base", "java.desktop", "java.logging", "java.sql", "java.naming"];

/// Complete configuration for one packaging pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
  pub app: PackagingMetadata,

  #[serde(default)]
  pub build: BuildSection,

  pub artifacts: ArtifactsSection,

  #[serde(default)]
  pub toolchain: ToolchainSection,

  #[serde(default)]
  pub runtime: RuntimeSection,

  #[serde(default)]
  pub installer: InstallerSection,
}

/// Immutable descriptive fields baked into the installer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackagingMetadata {
  /// Application name, also the installer's product name.
  pub name: String,
  pub vendor: String,
  /// Semantic version; also keys the runtime image directory.
  pub version: String,
  /// Main entry point inside the main artifact.
  pub main_class: String,
  /// Icon resource embedded in the installer.
  pub icon: PathBuf,
  /// Installer upgrade identity. Must stay constant across versions of the product.
  pub upgrade_uuid: String,
  /// Options handed to the application at launch time.
  #[serde(default = "default_launch_options")]
  pub launch_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
  /// Root of all persisted pipeline state.
  #[serde(default = "default_build_root")]
  pub root: PathBuf,
}

impl Default for BuildSection {
  fn default() -> Self {
    Self {
      root: default_build_root(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsSection {
  /// The application's primary output artifact.
  pub main: PathBuf,
  /// Individually listed runtime dependency files.
  #[serde(default)]
  pub dependencies: Vec<PathBuf>,
  /// Directories whose regular files are all runtime dependencies.
  #[serde(default)]
  pub dependency_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSection {
  /// Explicit toolchain home. Discovered from the environment when unset.
  #[serde(default)]
  pub home: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
  /// Statically declared safe superset of runtime modules.
  #[serde(default = "default_runtime_modules")]
  pub modules: Vec<String>,
  /// Module that every runtime image must contain.
  #[serde(default = "default_base_module")]
  pub base_module: String,
  /// File name prefix identifying framework module artifacts.
  #[serde(default = "default_framework_prefix")]
  pub framework_prefix: String,
  /// File name extension identifying framework module artifacts.
  #[serde(default = "default_framework_extension")]
  pub framework_extension: String,
  /// Replaces `-` when deriving a module name from a framework file name.
  #[serde(default = "default_module_separator")]
  pub module_separator: char,
}

impl Default for RuntimeSection {
  fn default() -> Self {
    Self {
      modules: default_runtime_modules(),
      base_module: default_base_module(),
      framework_prefix: default_framework_prefix(),
      framework_extension: default_framework_extension(),
      module_separator: default_module_separator(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerSection {
  /// Installer package type handed to the generator.
  #[serde(default = "default_installer_type", rename = "type")]
  pub kind: String,
  #[serde(default = "default_true")]
  pub menu: bool,
  #[serde(default = "default_true")]
  pub shortcut: bool,
  #[serde(default = "default_true")]
  pub dir_chooser: bool,
  #[serde(default = "default_true")]
  pub per_user_install: bool,
  /// Directory prepended to the generator's `PATH` (auxiliary installer toolset).
  #[serde(default)]
  pub path_prefix: Option<PathBuf>,
}

impl Default for InstallerSection {
  fn default() -> Self {
    Self {
      kind: default_installer_type(),
      menu: true,
      shortcut: true,
      dir_chooser: true,
      per_user_install: true,
      path_prefix: None,
    }
  }
}

impl PackConfig {
  /// Anchor every relative path to `base`.
  pub fn resolve_paths(&mut self, base: &Path) {
    let anchor = |p: &mut PathBuf| {
      if p.is_relative() {
        *p = base.join(&*p);
      }
    };

    anchor(&mut self.app.icon);
    anchor(&mut self.build.root);
    anchor(&mut self.artifacts.main);
    self.artifacts.dependencies.iter_mut().for_each(anchor);
    self.artifacts.dependency_dirs.iter_mut().for_each(anchor);
    if let Some(home) = self.toolchain.home.as_mut() {
      anchor(home);
    }
    if let Some(prefix) = self.installer.path_prefix.as_mut() {
      anchor(prefix);
    }
  }
}

fn default_launch_options() -> Vec<String> {
  DEFAULT_LAUNCH_OPTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_runtime_modules() -> Vec<String> {
  DEFAULT_RUNTIME_MODULES.iter().map(|s| s.to_string()).collect()
}

fn default_build_root() -> PathBuf {
  PathBuf::from("build")
}

fn default_base_module() -> String {
  "java.base".to_string()
}

fn default_framework_prefix() -> String {
  "javafx-".to_string()
}

fn default_framework_extension() -> String {
  ".jar".to_string()
}

fn default_module_separator() -> char {
  '.'
}

fn default_installer_type() -> String {
  "msi".to_string()
}

fn default_true() -> bool {
  true
}
