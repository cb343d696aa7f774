//! Persisted filesystem layout of a pipeline run.
//!
//! ```text
//! <build-root>/
//! ├── jpackage/input/     # staged artifacts (fully regenerated per run)
//! ├── runtime/<version>/  # runtime image (never updated once present)
//! └── installer/          # installer packages (accumulate across runs)
//! ```
//!
//! Everything below the build root is cache-like: safe to delete, unsafe to hand-edit.

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildLayout {
  root: PathBuf,
}

impl BuildLayout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Flat directory holding the main artifact and every dependency.
  pub fn input_dir(&self) -> PathBuf {
    self.root.join("jpackage").join("input")
  }

  /// Parent of all version-keyed runtime images.
  pub fn runtime_root(&self) -> PathBuf {
    self.root.join("runtime")
  }

  /// Runtime image for one application version.
  pub fn runtime_dir(&self, version: &str) -> PathBuf {
    self.runtime_root().join(version)
  }

  /// Destination directory for installer packages.
  pub fn installer_dir(&self) -> PathBuf {
    self.root.join("installer")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn layout_paths_hang_off_build_root() {
    let layout = BuildLayout::new("/project/build");
    assert_eq!(layout.input_dir(), PathBuf::from("/project/build/jpackage/input"));
    assert_eq!(layout.runtime_dir("1.0.0"), PathBuf::from("/project/build/runtime/1.0.0"));
    assert_eq!(layout.installer_dir(), PathBuf::from("/project/build/installer"));
  }

  #[test]
  fn runtime_images_are_keyed_by_version() {
    let layout = BuildLayout::new("build");
    assert_ne!(layout.runtime_dir("1.0.0"), layout.runtime_dir("1.0.1"));
    assert!(layout.runtime_dir("2.0.0").starts_with(layout.runtime_root()));
  }
}
