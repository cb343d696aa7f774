pub mod arch;
pub mod os;

use std::fmt;

use thiserror::Error;

use arch::Arch;
use os::Os;

/// OS family whose native runtime linker and installer generator are targeted.
pub const PACKAGING_OS: Os = Os::Windows;

/// Platform identifier combining architecture and OS (e.g., "x86_64-windows")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  /// Create a new platform identifier
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Returns the platform triple string (e.g., "x86_64-windows")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// Returns the platform triple for the current system (e.g., "x86_64-windows")
///
/// Returns `None` if the current platform is not supported
pub fn platform_triple() -> Option<String> {
  Platform::current().map(|p| p.triple())
}

/// A step was asked to run on a host it is not defined for.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{step} is only supported on {required} hosts (current host: {})", host_label(.host))]
pub struct UnsupportedPlatform {
  pub step: &'static str,
  pub required: Os,
  pub host: Option<Os>,
}

fn host_label(host: &Option<Os>) -> &'static str {
  host.map(|os| os.as_str()).unwrap_or("unknown")
}

/// Capability check for platform-gated steps.
///
/// Fails with [`UnsupportedPlatform`] unless `host` is exactly `required`. There is
/// no no-op fallback on other hosts.
pub fn require_os(host: Option<Os>, required: Os, step: &'static str) -> Result<(), UnsupportedPlatform> {
  if host == Some(required) {
    return Ok(());
  }
  Err(UnsupportedPlatform { step, required, host })
}
