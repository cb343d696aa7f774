//! Pipeline orchestration.
//!
//! Runs stage, runtime image synthesis and installer generation strictly in that
//! order. Every run starts from [`PipelineState::NotStarted`]; a step only runs when
//! its predecessor completed within the same run, and the first failure halts the
//! run in [`PipelineState::Failed`].
//!
//! Runs are not locked against each other. Two runs sharing a build root must be
//! serialized by the caller.

mod types;

use std::time::Instant;

use tracing::{error, info, warn};

pub use types::{
  ErrorKind, PipelineError, PipelinePlan, PipelineReport, PipelineState, RuntimeStepPlan, Step, StepError,
  StepOutcome, StepReport,
};

use crate::artifacts::ArtifactSet;
use crate::config::PackConfig;
use crate::installer::{InstallerError, InstallerRequest, build_installer, plan_installer};
use crate::layout::BuildLayout;
use crate::platform::os::{self, Os};
use crate::platform::{PACKAGING_OS, require_os};
use crate::runtime::{RuntimeError, RuntimeRequest, plan_runtime, synthesize_runtime};
use crate::stage::stage;
use crate::toolchain::Toolchain;

/// Sequential runner for one configuration.
#[derive(Debug)]
pub struct Pipeline {
  config: PackConfig,
  layout: BuildLayout,
  host: Option<Os>,
  toolchain: Option<Toolchain>,
  state: PipelineState,
}

/// Data carried from one step to the next within a run.
#[derive(Default)]
struct RunContext {
  staged: Option<ArtifactSet>,
  runtime_image: Option<std::path::PathBuf>,
}

impl Pipeline {
  pub fn new(config: PackConfig) -> Self {
    let layout = BuildLayout::new(&config.build.root);
    Self {
      config,
      layout,
      host: os::os(),
      toolchain: None,
      state: PipelineState::NotStarted,
    }
  }

  /// Override the detected host OS.
  pub fn with_host(mut self, host: Option<Os>) -> Self {
    self.host = host;
    self
  }

  /// Use `toolchain` instead of resolving one from configuration and environment.
  pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
    self.toolchain = Some(toolchain);
    self
  }

  pub fn config(&self) -> &PackConfig {
    &self.config
  }

  pub fn layout(&self) -> &BuildLayout {
    &self.layout
  }

  pub fn host(&self) -> Option<Os> {
    self.host
  }

  /// State reached by the last run.
  pub fn state(&self) -> PipelineState {
    self.state
  }

  /// Run every step up to and including `target`.
  pub async fn run_to(&mut self, target: Step) -> Result<PipelineReport, PipelineError> {
    self.state = PipelineState::NotStarted;
    let started = Instant::now();
    let mut ctx = RunContext::default();
    let mut steps = Vec::new();

    for step in Step::ALL.into_iter().filter(|s| *s <= target) {
      debug_assert_eq!(self.state, step.requires());
      info!(step = %step, "starting step");
      let step_started = Instant::now();

      match self.run_step(step, &mut ctx).await {
        Ok(outcome) => {
          self.state = step.completes();
          let elapsed = step_started.elapsed();
          info!(step = %step, state = %self.state, elapsed_ms = elapsed.as_millis() as u64, "step complete");
          steps.push(StepReport { outcome, elapsed });
        }
        Err(source) => {
          self.state = PipelineState::Failed(step);
          let err = PipelineError::new(step, source);
          error!(step = %step, error = %err.source, "pipeline halted");
          return Err(err);
        }
      }
    }

    Ok(PipelineReport {
      state: self.state,
      steps,
      elapsed: started.elapsed(),
    })
  }

  async fn run_step(&self, step: Step, ctx: &mut RunContext) -> Result<StepOutcome, StepError> {
    match step {
      Step::Stage => {
        let artifacts = ArtifactSet::from_config(&self.config.artifacts)?;
        let input = self.layout.input_dir();
        let result = stage(&artifacts, &input)?;
        ctx.staged = Some(artifacts.relocated(&input));
        Ok(StepOutcome::Staged(result))
      }
      Step::SynthesizeRuntime => {
        let staged = ctx.staged.as_ref().ok_or(StepError::OutOfOrder { step })?;
        require_os(self.host, PACKAGING_OS, step.name()).map_err(RuntimeError::from)?;
        let toolchain = self.resolve_toolchain()?;
        let output = self.layout.runtime_dir(&self.config.app.version);
        let request = RuntimeRequest {
          host: self.host,
          toolchain: &toolchain,
          staged,
          settings: &self.config.runtime,
          output: &output,
        };
        let outcome = synthesize_runtime(&request).await?;
        if outcome.was_skipped() {
          warn!(
            path = %output.display(),
            "reusing existing runtime image; it is not rebuilt when dependencies change, run `runpack clean --runtime` to force"
          );
        }
        ctx.runtime_image = Some(outcome.path().to_path_buf());
        Ok(StepOutcome::RuntimeImage(outcome))
      }
      Step::BuildInstaller => {
        let staged = ctx.staged.as_ref().ok_or(StepError::OutOfOrder { step })?;
        let runtime_image = ctx.runtime_image.as_deref().ok_or(StepError::OutOfOrder { step })?;
        require_os(self.host, PACKAGING_OS, step.name()).map_err(InstallerError::from)?;
        let toolchain = self.resolve_toolchain()?;
        let input = self.layout.input_dir();
        let dest = self.layout.installer_dir();
        let request = InstallerRequest {
          host: self.host,
          toolchain: &toolchain,
          metadata: &self.config.app,
          settings: &self.config.installer,
          input: &input,
          main_artifact: staged.main().name(),
          runtime_image,
          dest: &dest,
        };
        let result = build_installer(&request).await?;
        Ok(StepOutcome::Installer(result))
      }
    }
  }

  /// Resolve every step up to `target` without writing files or starting tools.
  ///
  /// Tool preconditions are still checked, so a plan fails for the same missing
  /// resources a real run would. The host platform is not checked.
  pub fn plan(&self, target: Step) -> Result<PipelinePlan, PipelineError> {
    let artifacts =
      ArtifactSet::from_config(&self.config.artifacts).map_err(|e| PipelineError::new(Step::Stage, e))?;
    let input = self.layout.input_dir();
    let staged = artifacts.relocated(&input);

    let mut plan = PipelinePlan {
      target,
      layout: self.layout.clone(),
      artifacts: staged.iter().map(|a| a.name().to_string()).collect(),
      runtime: None,
      installer: None,
    };
    if target == Step::Stage {
      return Ok(plan);
    }

    let step = Step::SynthesizeRuntime;
    let toolchain = self.resolve_toolchain().map_err(|e| PipelineError::new(step, e))?;
    let output = self.layout.runtime_dir(&self.config.app.version);
    let runtime = plan_runtime(&RuntimeRequest {
      host: self.host,
      toolchain: &toolchain,
      staged: &staged,
      settings: &self.config.runtime,
      output: &output,
    })
    .map_err(|e| PipelineError::new(step, e))?;
    plan.runtime = Some(RuntimeStepPlan {
      skip: output.exists(),
      output: runtime.output,
      modules: runtime.modules,
      command: runtime.command,
    });
    if target == Step::SynthesizeRuntime {
      return Ok(plan);
    }

    let dest = self.layout.installer_dir();
    let installer = plan_installer(&InstallerRequest {
      host: self.host,
      toolchain: &toolchain,
      metadata: &self.config.app,
      settings: &self.config.installer,
      input: &input,
      main_artifact: staged.main().name(),
      runtime_image: &output,
      dest: &dest,
    })
    .map_err(|e| PipelineError::new(Step::BuildInstaller, e))?;
    plan.installer = Some(installer);

    Ok(plan)
  }

  fn resolve_toolchain(&self) -> Result<Toolchain, StepError> {
    match &self.toolchain {
      Some(toolchain) => Ok(toolchain.clone()),
      None => Ok(Toolchain::discover(self.config.toolchain.home.as_deref())?),
    }
  }
}
