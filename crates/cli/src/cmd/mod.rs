mod clean;
mod info;
mod init;
mod plan;
mod run;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use runpack_lib::config::PackConfig;
use runpack_lib::pipeline::Step;

pub use clean::cmd_clean;
pub use info::cmd_info;
pub use init::cmd_init;
pub use plan::cmd_plan;
pub use run::cmd_run;

/// Pipeline step as named on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StepArg {
  Stage,
  Runtime,
  Installer,
}

impl From<StepArg> for Step {
  fn from(arg: StepArg) -> Self {
    match arg {
      StepArg::Stage => Step::Stage,
      StepArg::Runtime => Step::SynthesizeRuntime,
      StepArg::Installer => Step::BuildInstaller,
    }
  }
}

fn load_config(path: &Path) -> Result<PackConfig> {
  PackConfig::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}
