//! Implementation of the `runpack init` command.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use runpack_lib::init::init;

use crate::output::{OutputFormat, print_json, symbols};

/// Write a template `runpack.toml` into `dir`.
///
/// # Errors
///
/// Returns an error if the file already exists or cannot be written.
pub fn cmd_init(dir: &Path, output: OutputFormat) -> Result<()> {
  let result = init(dir).context("Failed to initialize configuration")?;

  if output.is_json() {
    return print_json(&result);
  }

  println!(
    "{} {}",
    symbols::SUCCESS.green(),
    "Initialized runpack configuration!".green().bold()
  );
  println!();
  println!("  {} Config:       {}", symbols::INFO.cyan(), result.config.display());
  println!("  {} Upgrade UUID: {}", symbols::INFO.cyan(), result.upgrade_uuid);
  println!();
  println!("{}", "Next steps:".bold());
  println!(
    "  1. Edit {} to point at your artifacts and icon",
    result.config.display().to_string().cyan()
  );
  println!("  2. Run: {}", "runpack plan".cyan());

  Ok(())
}
