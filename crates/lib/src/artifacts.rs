//! The artifact set: the application's main artifact plus its runtime dependencies.
//!
//! Entries are identified by file name because they all land in one flat staging
//! directory. Two different files with the same name (compared case-insensitively,
//! as the target file system does) are rejected rather than silently shadowed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::ArtifactsSection;

#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("artifact path has no file name: {}", path.display())]
  NoFileName { path: PathBuf },

  #[error("artifact name {name} is used by both {} and {}", first.display(), second.display())]
  DuplicateName {
    name: String,
    first: PathBuf,
    second: PathBuf,
  },

  #[error("failed to read dependency directory {}: {source}", path.display())]
  ReadDir { path: PathBuf, source: std::io::Error },
}

/// One file of the artifact set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  path: PathBuf,
  name: String,
}

impl Artifact {
  pub fn new(path: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
    let path = path.into();
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .ok_or_else(|| ArtifactError::NoFileName { path: path.clone() })?;
    Ok(Self { path, name })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// File name under which the artifact is staged.
  pub fn name(&self) -> &str {
    &self.name
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
  main: Artifact,
  dependencies: Vec<Artifact>,
}

impl ArtifactSet {
  /// Build an artifact set, enforcing unique file names.
  ///
  /// The same path listed twice (e.g. the main artifact also sitting in a dependency
  /// directory) is kept once.
  pub fn new(main: impl Into<PathBuf>, dependencies: impl IntoIterator<Item = PathBuf>) -> Result<Self, ArtifactError> {
    let main = Artifact::new(main)?;

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    seen.insert(main.name.to_lowercase(), main.path.clone());

    let mut deps = Vec::new();
    for path in dependencies {
      let artifact = Artifact::new(path)?;
      match seen.get(&artifact.name.to_lowercase()) {
        Some(existing) if *existing == artifact.path => {
          debug!(path = %artifact.path.display(), "ignoring duplicate artifact path");
        }
        Some(existing) => {
          return Err(ArtifactError::DuplicateName {
            name: artifact.name,
            first: existing.clone(),
            second: artifact.path,
          });
        }
        None => {
          seen.insert(artifact.name.to_lowercase(), artifact.path.clone());
          deps.push(artifact);
        }
      }
    }

    Ok(Self {
      main,
      dependencies: deps,
    })
  }

  /// Resolve the artifact set described by the `[artifacts]` section.
  ///
  /// Listed dependencies come first, followed by the regular files of each
  /// dependency directory in file-name order. Directories are not descended into.
  pub fn from_config(section: &ArtifactsSection) -> Result<Self, ArtifactError> {
    let mut dependencies = section.dependencies.clone();
    for dir in &section.dependency_dirs {
      dependencies.extend(scan_dir(dir)?);
    }
    Self::new(section.main.clone(), dependencies)
  }

  /// The same set as it appears once staged into `dir`.
  pub fn relocated(&self, dir: &Path) -> Self {
    let relocate = |a: &Artifact| Artifact {
      path: dir.join(&a.name),
      name: a.name.clone(),
    };
    Self {
      main: relocate(&self.main),
      dependencies: self.dependencies.iter().map(relocate).collect(),
    }
  }

  pub fn main(&self) -> &Artifact {
    &self.main
  }

  pub fn dependencies(&self) -> &[Artifact] {
    &self.dependencies
  }

  /// Every artifact, main artifact first.
  pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
    std::iter::once(&self.main).chain(self.dependencies.iter())
  }

  pub fn len(&self) -> usize {
    1 + self.dependencies.len()
  }

  pub fn is_empty(&self) -> bool {
    false
  }
}

fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
  let entries = fs::read_dir(dir).map_err(|source| ArtifactError::ReadDir {
    path: dir.to_path_buf(),
    source,
  })?;

  let mut files = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|source| ArtifactError::ReadDir {
      path: dir.to_path_buf(),
      source,
    })?;
    let path = entry.path();
    if path.is_file() {
      files.push(path);
    }
  }
  files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

  debug!(dir = %dir.display(), count = files.len(), "scanned dependency directory");
  Ok(files)
}
