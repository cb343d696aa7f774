//! Native installer generation.
//!
//! Hands the staged input directory, the runtime image and the packaging metadata
//! to the installer generator. The destination directory is not cleared between
//! runs, so it may accumulate packages from earlier versions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{InstallerSection, PackagingMetadata};
use crate::platform::os::Os;
use crate::platform::{PACKAGING_OS, UnsupportedPlatform, require_os};
use crate::process::{ProcessError, ToolCommand, ToolOutput, run_tool};
use crate::toolchain::{INSTALLER_TOOL, Toolchain};

#[derive(Debug, Error)]
pub enum InstallerError {
  #[error(transparent)]
  Unsupported(#[from] UnsupportedPlatform),

  #[error("icon not found: {}", path.display())]
  IconMissing { path: PathBuf },

  #[error("installer generator not found: {}", path.display())]
  GeneratorMissing { path: PathBuf },

  #[error(transparent)]
  Tool(#[from] ProcessError),
}

/// Everything the installer builder needs for one run.
#[derive(Debug, Clone)]
pub struct InstallerRequest<'a> {
  /// Detected host OS, `None` when unrecognised.
  pub host: Option<Os>,
  pub toolchain: &'a Toolchain,
  pub metadata: &'a PackagingMetadata,
  pub settings: &'a InstallerSection,
  /// Staged input directory.
  pub input: &'a Path,
  /// File name of the main artifact inside `input`.
  pub main_artifact: &'a str,
  pub runtime_image: &'a Path,
  pub dest: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallerResult {
  pub dest: PathBuf,
  /// Files that appeared in the destination during this run.
  pub packages: Vec<PathBuf>,
  pub tool: ToolOutput,
}

/// Check that the icon and the generator exist and build the generator command.
pub fn plan_installer(request: &InstallerRequest<'_>) -> Result<ToolCommand, InstallerError> {
  let metadata = request.metadata;
  let settings = request.settings;

  if !metadata.icon.is_file() {
    return Err(InstallerError::IconMissing {
      path: metadata.icon.clone(),
    });
  }

  let generator = request.toolchain.installer_generator(PACKAGING_OS);
  if !generator.is_file() {
    return Err(InstallerError::GeneratorMissing { path: generator });
  }

  let mut cmd = ToolCommand::new(INSTALLER_TOOL, generator)
    .opt("--type", settings.kind.as_str())
    .opt("--name", metadata.name.as_str())
    .opt("--vendor", metadata.vendor.as_str())
    .opt("--app-version", metadata.version.as_str())
    .path_opt("--input", request.input)
    .opt("--main-jar", request.main_artifact)
    .opt("--main-class", metadata.main_class.as_str())
    .path_opt("--runtime-image", request.runtime_image)
    .path_opt("--icon", &metadata.icon);

  let flags = [
    ("--win-menu", settings.menu),
    ("--win-shortcut", settings.shortcut),
    ("--win-dir-chooser", settings.dir_chooser),
    ("--win-per-user-install", settings.per_user_install),
  ];
  for (flag, enabled) in flags {
    if enabled {
      cmd = cmd.arg(flag);
    }
  }
  cmd = cmd.opt("--win-upgrade-uuid", metadata.upgrade_uuid.as_str());

  for option in &metadata.launch_options {
    cmd = cmd.opt("--java-options", option.as_str());
  }

  cmd = cmd.path_opt("--dest", request.dest);

  if let Some(prefix) = &settings.path_prefix {
    cmd = cmd.prepend_path(prefix, PACKAGING_OS.path_list_separator());
  }

  Ok(cmd)
}

/// Build the installer package into `request.dest`.
pub async fn build_installer(request: &InstallerRequest<'_>) -> Result<InstallerResult, InstallerError> {
  require_os(request.host, PACKAGING_OS, "installer generation")?;

  let cmd = plan_installer(request)?;

  if let Err(err) = fs::create_dir_all(request.dest) {
    warn!(dest = %request.dest.display(), error = %err, "could not create installer destination");
  }

  let before = snapshot(request.dest);

  info!(
    name = %request.metadata.name,
    version = %request.metadata.version,
    kind = %request.settings.kind,
    "building installer"
  );
  let tool = run_tool(&cmd).await?;

  let packages: Vec<PathBuf> = snapshot(request.dest)
    .into_iter()
    .filter(|(path, stamp)| before.get(path) != Some(stamp))
    .map(|(path, _)| path)
    .collect();
  if packages.is_empty() {
    warn!(dest = %request.dest.display(), "installer generator reported success but wrote no package");
  }
  for package in &packages {
    info!(package = %package.display(), "installer package written");
  }

  Ok(InstallerResult {
    dest: request.dest.to_path_buf(),
    packages,
    tool,
  })
}

/// Modification time and length of a file, used to spot packages rewritten in place.
type FileStamp = (Option<SystemTime>, u64);

fn snapshot(dir: &Path) -> BTreeMap<PathBuf, FileStamp> {
  let Ok(entries) = fs::read_dir(dir) else {
    return BTreeMap::new();
  };
  entries
    .filter_map(Result::ok)
    .filter_map(|e| {
      let meta = e.metadata().ok()?;
      meta.is_file().then(|| (e.path(), (meta.modified().ok(), meta.len())))
    })
    .collect()
}
