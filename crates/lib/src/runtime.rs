//! Runtime image synthesis.
//!
//! Links a minimal, stripped, compressed runtime containing exactly the selected
//! modules. The output directory doubles as the completion marker: when it already
//! exists the step is skipped without touching anything. That guard exists because
//! the linker refuses to write into an existing directory; it does not detect stale
//! images, so changing dependencies for an unchanged version requires removing the
//! image first (`runpack clean --runtime`). A link that fails removes whatever it
//! wrote, so a broken image never becomes a skip marker.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::artifacts::ArtifactSet;
use crate::config::RuntimeSection;
use crate::modules::{FrameworkPattern, ModuleError, ModuleSet, resolve_modules};
use crate::platform::os::Os;
use crate::platform::{PACKAGING_OS, UnsupportedPlatform, require_os};
use crate::process::{ProcessError, ToolCommand, ToolOutput, run_tool};
use crate::toolchain::{LINKER_TOOL, Toolchain};

#[derive(Debug, Error)]
pub enum RuntimeError {
  #[error(transparent)]
  Unsupported(#[from] UnsupportedPlatform),

  #[error("module linker not found: {}", path.display())]
  LinkerMissing { path: PathBuf },

  #[error("toolchain module repository not found: {}", path.display())]
  ModuleRepositoryMissing { path: PathBuf },

  #[error("no framework module artifacts among the dependencies (expected files named {prefix}*{extension})")]
  NoFrameworkArtifacts { prefix: String, extension: String },

  #[error(transparent)]
  Modules(#[from] ModuleError),

  #[error("failed to create {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Tool(#[from] ProcessError),
}

/// Everything the synthesizer needs for one run.
#[derive(Debug, Clone)]
pub struct RuntimeRequest<'a> {
  /// Detected host OS, `None` when unrecognised.
  pub host: Option<Os>,
  pub toolchain: &'a Toolchain,
  /// The artifact set as staged.
  pub staged: &'a ArtifactSet,
  pub settings: &'a RuntimeSection,
  /// Version-keyed output directory.
  pub output: &'a Path,
}

/// The linker invocation for a request, resolved but not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimePlan {
  pub output: PathBuf,
  pub modules: ModuleSet,
  /// File names of the framework artifacts placed on the module path.
  pub framework: Vec<String>,
  pub command: ToolCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RuntimeOutcome {
  /// The linker ran and produced a new image.
  Created {
    path: PathBuf,
    modules: ModuleSet,
    tool: ToolOutput,
  },
  /// An image already existed at the output path.
  Skipped { path: PathBuf },
}

impl RuntimeOutcome {
  pub fn path(&self) -> &Path {
    match self {
      RuntimeOutcome::Created { path, .. } | RuntimeOutcome::Skipped { path } => path,
    }
  }

  pub fn was_skipped(&self) -> bool {
    matches!(self, RuntimeOutcome::Skipped { .. })
  }
}

/// Check the toolchain and dependency preconditions and build the linker command.
///
/// Fails before anything is written when the linker or the module repository is
/// missing, or when no dependency follows the framework naming convention.
pub fn plan_runtime(request: &RuntimeRequest<'_>) -> Result<RuntimePlan, RuntimeError> {
  let linker = request.toolchain.linker(PACKAGING_OS);
  if !linker.is_file() {
    return Err(RuntimeError::LinkerMissing { path: linker });
  }

  let repository = request.toolchain.module_repository();
  if !repository.is_dir() {
    return Err(RuntimeError::ModuleRepositoryMissing { path: repository });
  }

  let pattern = FrameworkPattern::from_config(request.settings);
  let framework = pattern.select(request.staged);
  if framework.is_empty() {
    return Err(RuntimeError::NoFrameworkArtifacts {
      prefix: request.settings.framework_prefix.clone(),
      extension: request.settings.framework_extension.clone(),
    });
  }

  let modules = resolve_modules(request.settings, &framework)?;

  let separator = PACKAGING_OS.path_list_separator().to_string();
  let module_path = std::iter::once(repository.to_string_lossy().into_owned())
    .chain(framework.iter().map(|a| a.path().to_string_lossy().into_owned()))
    .collect::<Vec<_>>()
    .join(&separator);

  let command = ToolCommand::new(LINKER_TOOL, linker)
    .args(["--strip-debug", "--no-header-files", "--no-man-pages", "--compress=2"])
    .opt("--module-path", module_path)
    .opt("--add-modules", modules.to_arg())
    .path_opt("--output", request.output);

  Ok(RuntimePlan {
    output: request.output.to_path_buf(),
    modules,
    framework: framework.iter().map(|a| a.name().to_string()).collect(),
    command,
  })
}

/// Produce the runtime image, or skip when one already exists at the output path.
pub async fn synthesize_runtime(request: &RuntimeRequest<'_>) -> Result<RuntimeOutcome, RuntimeError> {
  require_os(request.host, PACKAGING_OS, "runtime image synthesis")?;

  let plan = plan_runtime(request)?;

  if plan.output.exists() {
    info!(path = %plan.output.display(), "runtime image already exists, skipping");
    return Ok(RuntimeOutcome::Skipped { path: plan.output });
  }

  if let Some(parent) = plan.output.parent() {
    fs::create_dir_all(parent).map_err(|source| RuntimeError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  info!(
    path = %plan.output.display(),
    framework = ?plan.framework,
    modules = %plan.modules.to_arg(),
    "synthesizing runtime image"
  );

  let tool = match run_tool(&plan.command).await {
    Ok(tool) => tool,
    Err(err) => {
      discard_partial_image(&plan.output);
      return Err(err.into());
    }
  };

  info!(path = %plan.output.display(), "runtime image ready");
  Ok(RuntimeOutcome::Created {
    path: plan.output,
    modules: plan.modules,
    tool,
  })
}

/// A failed link may leave a half-written image that a later run would skip over.
fn discard_partial_image(output: &Path) {
  if !output.exists() {
    return;
  }
  match fs::remove_dir_all(output) {
    Ok(()) => warn!(path = %output.display(), "removed partial runtime image"),
    Err(err) => warn!(
      path = %output.display(),
      error = %err,
      "could not remove partial runtime image, delete it before the next run"
    ),
  }
}
