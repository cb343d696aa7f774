//! Removal of persisted pipeline state.
//!
//! Everything under the build layout is cache-like and safe to delete. Removing
//! the runtime image directory is the only way to force re-synthesis for an
//! unchanged version.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::layout::BuildLayout;

#[derive(Debug, Error)]
pub enum CleanError {
  #[error("failed to delete {}: {source}", path.display())]
  Delete { path: PathBuf, source: std::io::Error },
}

/// Which parts of the layout to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanTargets {
  pub staging: bool,
  pub runtime: bool,
  pub installer: bool,
}

impl CleanTargets {
  pub fn all() -> Self {
    Self {
      staging: true,
      runtime: true,
      installer: true,
    }
  }

  /// No flag selected means everything.
  pub fn or_all(self) -> Self {
    if self == Self::default() { Self::all() } else { self }
  }
}

#[derive(Debug, Default, Serialize)]
pub struct CleanResult {
  pub deleted_paths: Vec<PathBuf>,
  pub bytes_freed: u64,
}

fn dir_size(path: &Path) -> u64 {
  WalkDir::new(path)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().is_file())
    .filter_map(|e| e.metadata().ok())
    .map(|m| m.len())
    .sum()
}

/// Delete the selected directories of `layout`. Missing directories are skipped.
pub fn clean(layout: &BuildLayout, targets: CleanTargets, dry_run: bool) -> Result<CleanResult, CleanError> {
  let mut candidates = Vec::new();
  if targets.staging {
    candidates.push(layout.input_dir());
  }
  if targets.runtime {
    candidates.push(layout.runtime_root());
  }
  if targets.installer {
    candidates.push(layout.installer_dir());
  }

  let mut result = CleanResult::default();
  for path in candidates {
    if !path.exists() {
      debug!(path = %path.display(), "nothing to clean");
      continue;
    }

    let size = dir_size(&path);
    if !dry_run {
      fs::remove_dir_all(&path).map_err(|source| CleanError::Delete {
        path: path.clone(),
        source,
      })?;
    }
    debug!(path = %path.display(), bytes = size, dry_run, "removed");
    result.bytes_freed += size;
    result.deleted_paths.push(path);
  }

  info!(
    deleted = result.deleted_paths.len(),
    bytes_freed = result.bytes_freed,
    dry_run,
    "clean complete"
  );
  Ok(result)
}
