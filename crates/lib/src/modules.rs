//! Module selection for the runtime image.
//!
//! The module list is the statically declared safe superset plus one module per
//! framework artifact found among the dependencies. Framework artifacts are
//! recognised by naming convention (`<prefix>...<extension>`), and their module
//! name is derived from the file name:
//!
//! ```text
//! javafx-controls-21-win.jar  --(separator '.')-->  javafx.controls
//! ui-framework-base.jar       --(separator '-')-->  ui-framework-base
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::artifacts::{Artifact, ArtifactSet};
use crate::config::RuntimeSection;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModuleError {
  #[error("the base module name must not be empty")]
  NoBaseModule,
}

/// Ordered, deduplicated list of module names. Always contains the base module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleSet(Vec<String>);

impl ModuleSet {
  /// Start from the declared superset, prepending `base` when it is missing.
  pub fn new<I, S>(base: &str, superset: I) -> Result<Self, ModuleError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let base = base.trim();
    if base.is_empty() {
      return Err(ModuleError::NoBaseModule);
    }

    let mut set = Self(Vec::new());
    let declared: Vec<String> = superset.into_iter().map(Into::into).collect();
    if !declared.iter().any(|m| m == base) {
      set.insert(base);
    }
    for module in declared {
      set.insert(module);
    }
    Ok(set)
  }

  /// Append `module` unless already present. Returns whether it was added.
  pub fn insert(&mut self, module: impl Into<String>) -> bool {
    let module = module.into();
    if self.contains(&module) {
      return false;
    }
    self.0.push(module);
    true
  }

  pub fn contains(&self, module: &str) -> bool {
    self.0.iter().any(|m| m == module)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Comma-separated form expected by `--add-modules`.
  pub fn to_arg(&self) -> String {
    self.0.join(",")
  }
}

/// Naming convention that identifies framework module artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkPattern {
  prefix: String,
  extension: String,
  separator: char,
}

impl FrameworkPattern {
  pub fn new(prefix: impl Into<String>, extension: impl Into<String>, separator: char) -> Self {
    Self {
      prefix: prefix.into().to_lowercase(),
      extension: extension.into().to_lowercase(),
      separator,
    }
  }

  pub fn from_config(section: &RuntimeSection) -> Self {
    Self::new(&section.framework_prefix, &section.framework_extension, section.module_separator)
  }

  /// Case-insensitive prefix and extension match on a file name.
  pub fn matches(&self, file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.len() > self.prefix.len() + self.extension.len()
      && lower.starts_with(&self.prefix)
      && lower.ends_with(&self.extension)
  }

  /// Module name provided by a matching file, or `None` when the file does not match.
  ///
  /// Version and classifier segments (from the first dash-separated segment that
  /// starts with a digit onwards) are dropped.
  pub fn module_name(&self, file_name: &str) -> Option<String> {
    if !self.matches(file_name) {
      return None;
    }

    let stem = file_name.get(..file_name.len().checked_sub(self.extension.len())?)?;
    let segments: Vec<&str> = stem
      .split('-')
      .take_while(|seg| !seg.starts_with(|c: char| c.is_ascii_digit()))
      .filter(|seg| !seg.is_empty())
      .collect();
    if segments.is_empty() {
      return None;
    }

    Some(segments.join(&self.separator.to_string()))
  }

  /// Dependencies of `artifacts` that follow this naming convention.
  pub fn select<'a>(&self, artifacts: &'a ArtifactSet) -> Vec<&'a Artifact> {
    artifacts
      .dependencies()
      .iter()
      .filter(|a| self.matches(a.name()))
      .collect()
  }
}

/// Full module list: declared superset followed by the discovered framework modules.
pub fn resolve_modules(section: &RuntimeSection, framework: &[&Artifact]) -> Result<ModuleSet, ModuleError> {
  let pattern = FrameworkPattern::from_config(section);
  let mut modules = ModuleSet::new(&section.base_module, section.modules.iter().cloned())?;
  for artifact in framework {
    if let Some(name) = pattern.module_name(artifact.name()) {
      modules.insert(name);
    }
  }
  Ok(modules)
}
