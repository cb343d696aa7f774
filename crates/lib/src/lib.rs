//! runpack-lib: packaging pipeline for self-contained desktop application installers.
//!
//! The pipeline turns an application artifact and its dependencies into a native
//! installer that embeds a minimal runtime image:
//! - `stage`: copy the artifact set into one flat input directory
//! - `runtime`: link a stripped runtime image with only the required modules
//! - `installer`: run the platform installer generator over both
//! - `pipeline`: run those steps in order and report where a run stopped

pub mod artifacts;
pub mod clean;
pub mod config;
pub mod consts;
pub mod init;
pub mod installer;
pub mod layout;
pub mod modules;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod runtime;
pub mod stage;
pub mod toolchain;

#[cfg(test)]
mod testutil;
