mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use runpack_lib::config::ConfigError;
use runpack_lib::consts::{APP_NAME, CONFIG_FILENAME, EXIT_CONFIG};
use runpack_lib::pipeline::{PipelineError, Step};

use crate::output::{OutputFormat, print_error};

/// runpack - build self-contained installers with a bundled runtime image
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to the configuration file
  #[arg(short, long, global = true, default_value = CONFIG_FILENAME)]
  config: PathBuf,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Copy the application artifact and its dependencies into the staging directory
  Stage,

  /// Stage, then link the runtime image (skipped if one exists for this version)
  #[command(visible_alias = "synthesize-runtime")]
  Runtime,

  /// Stage, link the runtime image, then build the native installer
  #[command(visible_aliases = ["build-installer", "package"])]
  Installer,

  /// Show what a run would do without writing files or starting tools
  Plan {
    /// Last step to plan
    #[arg(long, value_enum, default_value_t = cmd::StepArg::Installer)]
    until: cmd::StepArg,
  },

  /// Delete persisted pipeline state (everything when no flag is given)
  Clean {
    /// Remove the staging directory
    #[arg(long)]
    staging: bool,

    /// Remove runtime images, forcing re-synthesis on the next run
    #[arg(long)]
    runtime: bool,

    /// Remove generated installer packages
    #[arg(long)]
    installer: bool,

    /// Show what would be removed without deleting
    #[arg(long)]
    dry_run: bool,
  },

  /// Write a template configuration file
  Init {
    /// Directory to create runpack.toml in
    #[arg(default_value = ".")]
    dir: PathBuf,
  },

  /// Show host platform information
  Info,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(format!("runpack={0},runpack_lib={0}", default_level)));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Stage => cmd::cmd_run(&cli.config, Step::Stage, cli.output),
    Commands::Runtime => cmd::cmd_run(&cli.config, Step::SynthesizeRuntime, cli.output),
    Commands::Installer => cmd::cmd_run(&cli.config, Step::BuildInstaller, cli.output),
    Commands::Plan { until } => cmd::cmd_plan(&cli.config, until.into(), cli.output),
    Commands::Clean {
      staging,
      runtime,
      installer,
      dry_run,
    } => cmd::cmd_clean(&cli.config, staging, runtime, installer, dry_run, cli.output),
    Commands::Init { dir } => cmd::cmd_init(&dir, cli.output),
    Commands::Info => cmd::cmd_info(cli.output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::from(exit_code(&err))
    }
  }
}

/// Exit status for a failed command.
///
/// A failed step reports the pipeline's own code and an unusable configuration
/// reports `EX_CONFIG`. Anything else exits with 1.
fn exit_code(err: &anyhow::Error) -> u8 {
  let code = err.chain().find_map(|e| {
    if let Some(pipeline) = e.downcast_ref::<PipelineError>() {
      Some(pipeline.exit_code())
    } else if e.downcast_ref::<ConfigError>().is_some() {
      Some(EXIT_CONFIG)
    } else {
      None
    }
  });
  code
    .and_then(|c| u8::try_from(c).ok())
    .filter(|c| *c != 0)
    .unwrap_or(1)
}
