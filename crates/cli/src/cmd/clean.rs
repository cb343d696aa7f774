use std::path::Path;

use anyhow::{Context, Result};

use runpack_lib::clean::{CleanTargets, clean};
use runpack_lib::layout::BuildLayout;

use super::load_config;
use crate::output::{OutputFormat, format_bytes, print_info, print_json, print_stat, print_success};

pub fn cmd_clean(
  config: &Path,
  staging: bool,
  runtime: bool,
  installer: bool,
  dry_run: bool,
  output: OutputFormat,
) -> Result<()> {
  let config = load_config(config)?;
  let layout = BuildLayout::new(&config.build.root);
  let targets = CleanTargets {
    staging,
    runtime,
    installer,
  }
  .or_all();

  let result = clean(&layout, targets, dry_run).context("Clean failed")?;

  if output.is_json() {
    print_json(&result)?;
  } else {
    if dry_run {
      print_info("Dry run - no changes made");
    } else {
      print_success("Clean complete!");
    }
    for path in &result.deleted_paths {
      print_stat("Removed", &path.display().to_string());
    }
    print_stat("Space freed", &format_bytes(result.bytes_freed));
  }

  Ok(())
}
