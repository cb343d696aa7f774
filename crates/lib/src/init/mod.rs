//! Scaffold a new packaging configuration.
//!
//! Writes a commented `runpack.toml` with a freshly generated upgrade identity.
//! The identity is generated once here and must then stay fixed for the product.

mod templates;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::consts::CONFIG_FILENAME;

pub use templates::CONFIG_TEMPLATE;

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitError {
  #[error("file already exists: {}", path.display())]
  PathExists { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

/// Result of a successful initialization.
#[derive(Debug, Serialize)]
pub struct InitResult {
  /// Path to the created configuration file.
  pub config: PathBuf,
  /// Upgrade identity written into the template.
  pub upgrade_uuid: String,
}

/// Render the configuration template with `upgrade_uuid`.
pub fn render_template(upgrade_uuid: &str) -> String {
  CONFIG_TEMPLATE.replace("{upgrade_uuid}", upgrade_uuid)
}

/// Write a template `runpack.toml` into `dir`, creating the directory if needed.
///
/// # Errors
///
/// Returns an error if the file already exists, or if the directory or the
/// file cannot be written.
pub fn init(dir: &Path) -> Result<InitResult, InitError> {
  let config = dir.join(CONFIG_FILENAME);
  if config.exists() {
    return Err(InitError::PathExists { path: config });
  }

  fs::create_dir_all(dir).map_err(|source| InitError::CreateDir {
    path: dir.to_path_buf(),
    source,
  })?;

  let upgrade_uuid = uuid::Uuid::new_v4().to_string();
  fs::write(&config, render_template(&upgrade_uuid)).map_err(|source| InitError::WriteFile {
    path: config.clone(),
    source,
  })?;

  info!(path = %config.display(), "wrote configuration template");
  Ok(InitResult { config, upgrade_uuid })
}
