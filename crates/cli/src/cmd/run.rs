//! Implementation of `runpack stage`, `runpack runtime` and `runpack installer`.
//!
//! Each command runs the pipeline from the start up to its step.

use std::path::Path;

use anyhow::{Context, Result};

use runpack_lib::pipeline::{Pipeline, PipelineReport, Step, StepOutcome};
use runpack_lib::runtime::RuntimeOutcome;

use super::load_config;
use crate::output::{OutputFormat, format_bytes, format_duration, print_json, print_skip, print_stat, print_success};

pub fn cmd_run(config: &Path, target: Step, output: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let mut pipeline = Pipeline::new(config);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(pipeline.run_to(target))?;

  if output.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report);
  }

  Ok(())
}

fn print_report(report: &PipelineReport) {
  println!();
  for step in &report.steps {
    match &step.outcome {
      StepOutcome::Staged(result) => {
        print_success(&format!("Staged {} file(s)", result.files.len()));
        print_stat("Directory", &result.dir.display().to_string());
        print_stat("Size", &format_bytes(result.bytes));
      }
      StepOutcome::RuntimeImage(RuntimeOutcome::Created { path, modules, .. }) => {
        print_success("Runtime image created");
        print_stat("Directory", &path.display().to_string());
        print_stat("Modules", &modules.to_arg());
      }
      StepOutcome::RuntimeImage(RuntimeOutcome::Skipped { path }) => {
        print_skip("Runtime image already exists, reused");
        print_stat("Directory", &path.display().to_string());
        print_stat("Hint", "run `runpack clean --runtime` after changing dependencies");
      }
      StepOutcome::Installer(result) => {
        print_success("Installer built");
        print_stat("Destination", &result.dest.display().to_string());
        for package in &result.packages {
          print_stat("Package", &package.display().to_string());
        }
      }
    }
    print_stat("Duration", &format_duration(step.elapsed));
  }
  println!();
  print_success(&format!("Pipeline {} in {}", report.state, format_duration(report.elapsed)));
}
