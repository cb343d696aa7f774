//! Loading and validation of `runpack.toml`.

mod types;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use types::{
  ArtifactsSection, BuildSection, DEFAULT_LAUNCH_OPTIONS, DEFAULT_RUNTIME_MODULES, InstallerSection, PackConfig,
  PackagingMetadata, RuntimeSection, ToolchainSection,
};

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("missing required value: {key}")]
  MissingValue { key: &'static str },

  #[error("invalid value for {key}: {message}")]
  Invalid { key: &'static str, message: String },
}

impl PackConfig {
  /// Load, anchor and validate the configuration at `path`.
  ///
  /// Relative paths inside the file resolve against the file's directory.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Err(ConfigError::NotFound {
        path: path.to_path_buf(),
      });
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let base = path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from("."));
    let base = dunce::canonicalize(&base).unwrap_or(base);

    debug!(path = %path.display(), base = %base.display(), "loading config");

    Self::parse(&content, &base).map_err(|e| match e {
      ConfigError::Parse { source, .. } => ConfigError::Parse {
        path: path.to_path_buf(),
        source,
      },
      other => other,
    })
  }

  /// Parse configuration text, anchoring relative paths to `base`.
  pub fn parse(content: &str, base: &Path) -> Result<Self, ConfigError> {
    let mut config: PackConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
      path: PathBuf::from("<inline>"),
      source,
    })?;
    config.resolve_paths(base);
    config.validate()?;
    Ok(config)
  }

  /// Check the invariants serde cannot express.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let required = [
      ("app.name", &self.app.name),
      ("app.vendor", &self.app.vendor),
      ("app.version", &self.app.version),
      ("app.main_class", &self.app.main_class),
      ("app.upgrade_uuid", &self.app.upgrade_uuid),
      ("runtime.base_module", &self.runtime.base_module),
      ("runtime.framework_prefix", &self.runtime.framework_prefix),
      ("installer.type", &self.installer.kind),
    ];
    for (key, value) in required {
      if value.trim().is_empty() {
        return Err(ConfigError::MissingValue { key });
      }
    }

    if self.app.version.contains(['/', '\\']) || self.app.version == "." || self.app.version == ".." {
      return Err(ConfigError::Invalid {
        key: "app.version",
        message: format!("{:?} cannot be used as a directory name", self.app.version),
      });
    }

    if uuid::Uuid::parse_str(self.app.upgrade_uuid.trim()).is_err() {
      return Err(ConfigError::Invalid {
        key: "app.upgrade_uuid",
        message: format!("{:?} is not a UUID", self.app.upgrade_uuid),
      });
    }

    if let Some(blank) = self.runtime.modules.iter().find(|m| m.trim().is_empty()) {
      return Err(ConfigError::Invalid {
        key: "runtime.modules",
        message: format!("module names must not be blank (got {:?})", blank),
      });
    }

    if let Some(blank) = self.app.launch_options.iter().find(|o| o.trim().is_empty()) {
      return Err(ConfigError::Invalid {
        key: "app.launch_options",
        message: format!("launch options must not be blank (got {:?})", blank),
      });
    }

    Ok(())
  }
}
