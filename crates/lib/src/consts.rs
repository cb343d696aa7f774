//! Crate-wide constants.

/// Application name, used for the binary and the environment variable prefix.
pub const APP_NAME: &str = "runpack";

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "runpack.toml";

/// Environment variable naming the toolchain home explicitly.
pub const TOOLCHAIN_HOME_ENV: &str = "RUNPACK_TOOLCHAIN_HOME";

/// Fallback environment variable for toolchain discovery.
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";

/// Exit status for configuration and precondition failures (sysexits `EX_CONFIG`).
pub const EXIT_CONFIG: i32 = 78;

/// Exit status for filesystem failures (sysexits `EX_IOERR`).
pub const EXIT_IO: i32 = 74;

/// Exit status for a tool that terminated without an exit code (killed by a signal).
pub const EXIT_TOOL_TERMINATED: i32 = 1;
