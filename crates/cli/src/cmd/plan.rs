//! Implementation of `runpack plan`.

use std::path::Path;

use anyhow::Result;

use runpack_lib::pipeline::{Pipeline, Step};

use super::load_config;
use crate::output::{OutputFormat, print_info, print_json, print_skip, print_stat};

pub fn cmd_plan(config: &Path, target: Step, output: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let pipeline = Pipeline::new(config);
  let plan = pipeline.plan(target)?;

  if output.is_json() {
    return print_json(&plan);
  }

  print_info(&format!("Plan up to {}", plan.target));
  print_stat("Build root", &plan.layout.root().display().to_string());
  println!();

  print_info(&format!("Stage {} file(s)", plan.artifacts.len()));
  print_stat("Into", &plan.layout.input_dir().display().to_string());
  for name in &plan.artifacts {
    println!("    {}", name);
  }

  if let Some(runtime) = &plan.runtime {
    println!();
    if runtime.skip {
      print_skip("Runtime image exists, linker would not run");
    } else {
      print_info("Link runtime image");
    }
    print_stat("Output", &runtime.output.display().to_string());
    print_stat("Modules", &runtime.modules.to_arg());
    print_stat("Command", &runtime.command.command_line());
  }

  if let Some(installer) = &plan.installer {
    println!();
    print_info("Build installer");
    print_stat("Command", &installer.command_line());
    if let Some(prefix) = installer.path_prefix() {
      print_stat("PATH prefix", &prefix.dir.display().to_string());
    }
  }

  Ok(())
}
