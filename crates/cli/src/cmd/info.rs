use anyhow::Result;
use serde::Serialize;

use runpack_lib::platform::os::os;
use runpack_lib::platform::{PACKAGING_OS, platform_triple, require_os};
use runpack_lib::toolchain::Toolchain;

use crate::output::{OutputFormat, print_json};

#[derive(Serialize)]
struct InfoReport {
  platform: Option<String>,
  packaging_os: String,
  packaging_supported: bool,
  toolchain_home: Option<String>,
}

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let supported = require_os(os(), PACKAGING_OS, "packaging");
  let report = InfoReport {
    platform: platform_triple(),
    packaging_os: PACKAGING_OS.to_string(),
    packaging_supported: supported.is_ok(),
    toolchain_home: Toolchain::discover(None)
      .ok()
      .map(|t| t.home().display().to_string()),
  };

  if output.is_json() {
    return print_json(&report);
  }

  println!("System:");
  match &report.platform {
    Some(triple) => println!("Platform: {}", triple),
    None => println!("Could not detect platform."),
  }
  match supported {
    Ok(()) => println!("Packaging: supported"),
    Err(e) => println!("Packaging: {}", e),
  }
  match &report.toolchain_home {
    Some(home) => println!("Toolchain: {}", home),
    None => println!("Toolchain: not found (set RUNPACK_TOOLCHAIN_HOME or JAVA_HOME)"),
  }

  Ok(())
}
