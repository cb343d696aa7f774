//! Artifact staging.
//!
//! Copies the main artifact and every dependency into one flat directory. The
//! directory is rebuilt from scratch on every run: files are copied into a sibling
//! work directory first and swapped in only once every copy succeeded, so a failed
//! run never leaves a half-staged directory where downstream steps look for input.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::artifacts::ArtifactSet;

#[derive(Debug, Error)]
pub enum StageError {
  #[error("failed to prepare staging directory {}: {source}", path.display())]
  Prepare { path: PathBuf, source: io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: io::Error,
  },

  #[error("failed to publish staging directory {}: {source}", path.display())]
  Publish { path: PathBuf, source: io::Error },
}

/// Result of a successful staging run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
  /// The staging directory.
  pub dir: PathBuf,
  /// Staged file names, main artifact first.
  pub files: Vec<String>,
  /// Total bytes copied.
  pub bytes: u64,
}

/// Stage `artifacts` into `dest`, replacing whatever was there before.
pub fn stage(artifacts: &ArtifactSet, dest: &Path) -> Result<StageResult, StageError> {
  let work = work_dir(dest);
  info!(dest = %dest.display(), count = artifacts.len(), "staging artifacts");

  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(|source| StageError::Prepare {
      path: parent.to_path_buf(),
      source,
    })?;
  }
  reset_dir(&work).map_err(|source| StageError::Prepare {
    path: work.clone(),
    source,
  })?;

  let copied = copy_all(artifacts, &work);
  let (files, bytes) = match copied {
    Ok(done) => done,
    Err(e) => {
      discard(&work);
      return Err(e);
    }
  };

  if let Err(source) = publish(&work, dest) {
    discard(&work);
    return Err(StageError::Publish {
      path: dest.to_path_buf(),
      source,
    });
  }

  info!(dest = %dest.display(), files = files.len(), bytes, "artifacts staged");
  Ok(StageResult {
    dir: dest.to_path_buf(),
    files,
    bytes,
  })
}

fn work_dir(dest: &Path) -> PathBuf {
  let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".partial");
  dest.with_file_name(name)
}

fn reset_dir(dir: &Path) -> io::Result<()> {
  if dir.exists() {
    fs::remove_dir_all(dir)?;
  }
  fs::create_dir_all(dir)
}

fn copy_all(artifacts: &ArtifactSet, work: &Path) -> Result<(Vec<String>, u64), StageError> {
  let mut files = Vec::with_capacity(artifacts.len());
  let mut bytes = 0;

  for artifact in artifacts.iter() {
    let target = work.join(artifact.name());
    debug!(from = %artifact.path().display(), to = %target.display(), "copying artifact");
    bytes += fs::copy(artifact.path(), &target).map_err(|source| StageError::Copy {
      from: artifact.path().to_path_buf(),
      to: target.clone(),
      source,
    })?;
    files.push(artifact.name().to_string());
  }

  Ok((files, bytes))
}

fn publish(work: &Path, dest: &Path) -> io::Result<()> {
  if dest.exists() {
    fs::remove_dir_all(dest)?;
  }
  fs::rename(work, dest)
}

fn discard(work: &Path) {
  if let Err(e) = fs::remove_dir_all(work) {
    warn!(path = %work.display(), error = %e, "failed to remove partial staging directory");
  }
}
