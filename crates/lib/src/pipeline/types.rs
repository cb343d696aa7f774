//! Types for pipeline orchestration.
//!
//! States, steps, per-step outcomes and the error that identifies which step
//! halted a run.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::artifacts::ArtifactError;
use crate::consts::{EXIT_CONFIG, EXIT_IO, EXIT_TOOL_TERMINATED};
use crate::installer::{InstallerError, InstallerResult};
use crate::layout::BuildLayout;
use crate::modules::ModuleSet;
use crate::process::{ProcessError, ToolCommand};
use crate::runtime::{RuntimeError, RuntimeOutcome};
use crate::stage::{StageError, StageResult};
use crate::toolchain::ToolchainError;

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  Stage,
  SynthesizeRuntime,
  BuildInstaller,
}

impl Step {
  pub const ALL: [Step; 3] = [Step::Stage, Step::SynthesizeRuntime, Step::BuildInstaller];

  /// Entry-point name of the step.
  pub fn name(self) -> &'static str {
    match self {
      Step::Stage => "stage",
      Step::SynthesizeRuntime => "synthesize-runtime",
      Step::BuildInstaller => "build-installer",
    }
  }

  /// State the pipeline must be in before this step may run.
  pub fn requires(self) -> PipelineState {
    match self {
      Step::Stage => PipelineState::NotStarted,
      Step::SynthesizeRuntime => PipelineState::Staged,
      Step::BuildInstaller => PipelineState::RuntimeImageReady,
    }
  }

  /// State reached once this step completes.
  pub fn completes(self) -> PipelineState {
    match self {
      Step::Stage => PipelineState::Staged,
      Step::SynthesizeRuntime => PipelineState::RuntimeImageReady,
      Step::BuildInstaller => PipelineState::InstallerBuilt,
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum PipelineState {
  NotStarted,
  Staged,
  RuntimeImageReady,
  InstallerBuilt,
  /// Halted by the failure of the given step.
  Failed(Step),
}

impl fmt::Display for PipelineState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PipelineState::NotStarted => f.write_str("not started"),
      PipelineState::Staged => f.write_str("staged"),
      PipelineState::RuntimeImageReady => f.write_str("runtime image ready"),
      PipelineState::InstallerBuilt => f.write_str("installer built"),
      PipelineState::Failed(step) => write!(f, "failed at {}", step),
    }
  }
}

/// Broad failure class, used to pick the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// Missing resource or wrong host, detected before any subprocess starts.
  Configuration,
  /// An external tool exited unsuccessfully.
  Subprocess,
  /// Filesystem failure.
  Io,
}

/// Failure of a single step.
#[derive(Debug, Error)]
pub enum StepError {
  #[error(transparent)]
  Artifacts(#[from] ArtifactError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error(transparent)]
  Toolchain(#[from] ToolchainError),

  #[error(transparent)]
  Runtime(#[from] RuntimeError),

  #[error(transparent)]
  Installer(#[from] InstallerError),

  #[error("{step} requires its preceding steps to complete in the same run")]
  OutOfOrder { step: Step },
}

impl StepError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      StepError::Artifacts(ArtifactError::ReadDir { .. }) => ErrorKind::Io,
      StepError::Artifacts(_) | StepError::Toolchain(_) | StepError::OutOfOrder { .. } => ErrorKind::Configuration,
      StepError::Stage(_) => ErrorKind::Io,
      StepError::Runtime(RuntimeError::Tool(e)) | StepError::Installer(InstallerError::Tool(e)) => process_kind(e),
      StepError::Runtime(RuntimeError::CreateDir { .. }) => ErrorKind::Io,
      StepError::Runtime(_) | StepError::Installer(_) => ErrorKind::Configuration,
    }
  }

  fn process_error(&self) -> Option<&ProcessError> {
    match self {
      StepError::Runtime(RuntimeError::Tool(e)) | StepError::Installer(InstallerError::Tool(e)) => Some(e),
      _ => None,
    }
  }
}

fn process_kind(err: &ProcessError) -> ErrorKind {
  match err {
    ProcessError::Failed { .. } => ErrorKind::Subprocess,
    ProcessError::Spawn { .. } | ProcessError::Output { .. } => ErrorKind::Io,
  }
}

/// A step failure, tagged with the step that raised it.
#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct PipelineError {
  pub step: Step,
  #[source]
  pub source: StepError,
}

impl PipelineError {
  pub fn new(step: Step, source: impl Into<StepError>) -> Self {
    Self {
      step,
      source: source.into(),
    }
  }

  pub fn kind(&self) -> ErrorKind {
    self.source.kind()
  }

  /// Process exit status for this failure.
  ///
  /// A failing tool's own code is passed through; precondition failures map to
  /// `EX_CONFIG`, filesystem failures to `EX_IOERR`.
  pub fn exit_code(&self) -> i32 {
    if let Some(code) = self.source.process_error().and_then(ProcessError::exit_code) {
      return code;
    }
    match self.kind() {
      ErrorKind::Configuration => EXIT_CONFIG,
      ErrorKind::Io => EXIT_IO,
      ErrorKind::Subprocess => EXIT_TOOL_TERMINATED,
    }
  }
}

/// What a completed step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutcome {
  Staged(StageResult),
  RuntimeImage(RuntimeOutcome),
  Installer(InstallerResult),
}

impl StepOutcome {
  pub fn step(&self) -> Step {
    match self {
      StepOutcome::Staged(_) => Step::Stage,
      StepOutcome::RuntimeImage(_) => Step::SynthesizeRuntime,
      StepOutcome::Installer(_) => Step::BuildInstaller,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
  pub outcome: StepOutcome,
  #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
  pub elapsed: Duration,
}

/// Summary of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
  pub state: PipelineState,
  pub steps: Vec<StepReport>,
  #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
  pub elapsed: Duration,
}

impl PipelineReport {
  pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
    self.steps.iter().map(|s| &s.outcome).find(|o| o.step() == step)
  }
}

/// Everything a run up to some step would do, resolved without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelinePlan {
  pub target: Step,
  pub layout: BuildLayout,
  /// Staged file names, main artifact first.
  pub artifacts: Vec<String>,
  pub runtime: Option<RuntimeStepPlan>,
  pub installer: Option<ToolCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeStepPlan {
  pub output: PathBuf,
  /// An image already exists and the linker would not run.
  pub skip: bool,
  pub modules: ModuleSet,
  pub command: ToolCommand,
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(value.as_millis() as u64)
}
