//! Template content for `runpack init`.

/// Template for `runpack.toml`.
/// Contains an `{upgrade_uuid}` placeholder for substitution.
pub const CONFIG_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/runpack.toml"));
