//! Toolchain home resolution.
//!
//! The toolchain home is the root of the runtime installation that provides the
//! module-linking tool, the installer generator and the module repository:
//!
//! ```text
//! <home>/
//! ├── bin/jlink[.exe]
//! ├── bin/jpackage[.exe]
//! └── jmods/
//! ```
//!
//! Resolution only picks a directory. Whether the tools actually exist is checked
//! by the steps that need them, right before they run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{JAVA_HOME_ENV, TOOLCHAIN_HOME_ENV};
use crate::platform::os::Os;

/// Module-linking tool name (without executable suffix).
pub const LINKER_TOOL: &str = "jlink";

/// Installer generator tool name (without executable suffix).
pub const INSTALLER_TOOL: &str = "jpackage";

/// Module repository directory inside the toolchain home.
pub const MODULE_REPOSITORY_DIR: &str = "jmods";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolchainError {
  #[error("no toolchain home configured: set [toolchain] home, RUNPACK_TOOLCHAIN_HOME or JAVA_HOME")]
  NotConfigured,
}

/// Where the toolchain home came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolchainSource {
  Config,
  Env(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
  home: PathBuf,
  source: ToolchainSource,
}

impl Toolchain {
  pub fn new(home: impl Into<PathBuf>) -> Self {
    Self {
      home: home.into(),
      source: ToolchainSource::Config,
    }
  }

  /// Resolve the toolchain home.
  ///
  /// Precedence: the configured path, then `RUNPACK_TOOLCHAIN_HOME`, then `JAVA_HOME`.
  /// Empty environment values count as unset.
  pub fn discover(configured: Option<&Path>) -> Result<Self, ToolchainError> {
    if let Some(home) = configured {
      debug!(home = %home.display(), "using configured toolchain home");
      return Ok(Self::new(home));
    }

    for var in [TOOLCHAIN_HOME_ENV, JAVA_HOME_ENV] {
      if let Some(value) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        let home = PathBuf::from(value);
        debug!(var, home = %home.display(), "discovered toolchain home from environment");
        return Ok(Self {
          home,
          source: ToolchainSource::Env(var),
        });
      }
    }

    Err(ToolchainError::NotConfigured)
  }

  pub fn home(&self) -> &Path {
    &self.home
  }

  pub fn source(&self) -> ToolchainSource {
    self.source
  }

  /// Path of a `bin/` executable as named on `os`.
  pub fn tool(&self, os: Os, name: &str) -> PathBuf {
    self.home.join("bin").join(os.exe_name(name))
  }

  pub fn linker(&self, os: Os) -> PathBuf {
    self.tool(os, LINKER_TOOL)
  }

  pub fn installer_generator(&self, os: Os) -> PathBuf {
    self.tool(os, INSTALLER_TOOL)
  }

  pub fn module_repository(&self) -> PathBuf {
    self.home.join(MODULE_REPOSITORY_DIR)
  }
}
