//! External tool invocation.
//!
//! Both native tools the pipeline drives are run the same way:
//! - spawn from an argument vector (no shell in between)
//! - drain stdout and stderr concurrently, logging every line as it arrives
//! - wait for the exit status only after both streams hit EOF
//! - map a non-zero exit status to [`ProcessError::Failed`]
//!
//! There is no timeout. A tool that never exits blocks the pipeline. The child is
//! killed if the run is abandoned (output lost, or the future dropped).

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::consts::EXIT_TOOL_TERMINATED;

#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("failed to start {tool} ({}): {source}", program.display())]
  Spawn {
    tool: String,
    program: PathBuf,
    source: io::Error,
  },

  #[error("failed to read output of {tool}: {source}")]
  Output { tool: String, source: io::Error },

  #[error("{tool} failed with exit code {}", code.map(|c| c.to_string()).unwrap_or_else(|| "none (terminated)".to_string()))]
  Failed { tool: String, code: Option<i32> },
}

impl ProcessError {
  /// Exit status the pipeline reports for this failure.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ProcessError::Failed { code, .. } => Some(code.unwrap_or(EXIT_TOOL_TERMINATED)),
      ProcessError::Spawn { .. } | ProcessError::Output { .. } => None,
    }
  }
}

/// A fully constructed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCommand {
  tool: String,
  program: PathBuf,
  args: Vec<String>,
  path_prefix: Option<PathPrefix>,
}

/// Directory prepended to the child's inherited `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathPrefix {
  pub dir: PathBuf,
  pub separator: char,
}

impl ToolCommand {
  /// `tool` is a short label used in logs and errors; `program` is the executable.
  pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
    Self {
      tool: tool.into(),
      program: program.into(),
      args: Vec::new(),
      path_prefix: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Append `flag value`.
  pub fn opt(self, flag: &str, value: impl Into<String>) -> Self {
    self.arg(flag).arg(value)
  }

  /// Append `flag path`, rendering the path as-is.
  pub fn path_opt(self, flag: &str, value: &Path) -> Self {
    self.opt(flag, value.to_string_lossy())
  }

  /// Prepend `dir` to the inherited `PATH` of the child process.
  pub fn prepend_path(mut self, dir: impl Into<PathBuf>, separator: char) -> Self {
    self.path_prefix = Some(PathPrefix {
      dir: dir.into(),
      separator,
    });
    self
  }

  pub fn tool(&self) -> &str {
    &self.tool
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  pub fn get_args(&self) -> &[String] {
    &self.args
  }

  pub fn path_prefix(&self) -> Option<&PathPrefix> {
    self.path_prefix.as_ref()
  }

  /// Space-joined command line, quoting empty arguments and arguments with whitespace.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.to_string_lossy().into_owned())
      .chain(self.args.iter().cloned())
      .map(|part| quote(&part))
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// `PATH` value for the child: prefix, separator, then whatever was inherited.
  fn child_path(&self) -> Option<OsString> {
    let prefix = self.path_prefix.as_ref()?;
    let mut path = OsString::from(prefix.dir.as_os_str());
    path.push(prefix.separator.to_string());
    if let Some(inherited) = std::env::var_os("PATH") {
      path.push(inherited);
    }
    Some(path)
  }
}

fn quote(part: &str) -> String {
  if part.is_empty() || part.chars().any(char::is_whitespace) {
    format!("\"{}\"", part)
  } else {
    part.to_string()
  }
}

/// Outcome of a successful tool run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
  /// Output lines forwarded to the log (stdout and stderr combined).
  pub lines: usize,
  #[serde(with = "duration_millis")]
  pub elapsed: Duration,
}

/// Run `cmd` to completion, streaming its output to the log.
pub async fn run_tool(cmd: &ToolCommand) -> Result<ToolOutput, ProcessError> {
  let tool = cmd.tool.as_str();
  info!(tool, command = %cmd.command_line(), "running tool");

  let mut command = Command::new(&cmd.program);
  command
    .args(&cmd.args)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);
  if let Some(path) = cmd.child_path() {
    debug!(tool, path = ?path, "extended PATH for tool");
    command.env("PATH", path);
  }

  let started = Instant::now();
  let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
    tool: tool.to_string(),
    program: cmd.program.clone(),
    source,
  })?;

  let (stdout, stderr) = tokio::join!(drain(tool, child.stdout.take()), drain(tool, child.stderr.take()));
  let output_error = |source| ProcessError::Output {
    tool: tool.to_string(),
    source,
  };
  let lines = match (stdout, stderr) {
    (Ok(out), Ok(err)) => out + err,
    (Err(source), _) | (_, Err(source)) => {
      warn!(tool, error = %source, "lost tool output, killing tool");
      if let Err(err) = child.kill().await {
        warn!(tool, error = %err, "could not kill tool");
      }
      return Err(output_error(source));
    }
  };

  let status = child.wait().await.map_err(output_error)?;
  let elapsed = started.elapsed();

  if !status.success() {
    error!(tool, code = ?status.code(), "tool failed");
    return Err(ProcessError::Failed {
      tool: tool.to_string(),
      code: status.code(),
    });
  }

  debug!(tool, lines, elapsed_ms = elapsed.as_millis() as u64, "tool finished");
  Ok(ToolOutput { lines, elapsed })
}

/// Forward every line of `reader` to the log. Bytes are decoded lossily.
async fn drain<R>(tool: &str, reader: Option<R>) -> io::Result<usize>
where
  R: AsyncRead + Unpin,
{
  let Some(reader) = reader else {
    return Ok(0);
  };

  let mut reader = BufReader::new(reader);
  let mut buf = Vec::new();
  let mut count = 0;
  loop {
    buf.clear();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
      break;
    }
    let line = String::from_utf8_lossy(&buf);
    info!(tool, "{}", line.trim_end_matches(['\r', '\n']));
    count += 1;
  }
  Ok(count)
}

mod duration_millis {
  use std::time::Duration;

  use serde::Serializer;

  pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::shell_tool;
  use serial_test::serial;
  use tracing_test::traced_test;

  #[test]
  fn command_line_quotes_where_needed() {
    let cmd = ToolCommand::new("jpackage", "/jdk/bin/jpackage")
      .opt("--vendor", "XCON X-SERIES")
      .opt("--description", "")
      .arg("--win-menu");
    assert_eq!(
      cmd.command_line(),
      "/jdk/bin/jpackage --vendor \"XCON X-SERIES\" --description \"\" --win-menu"
    );
  }

  #[test]
  #[serial]
  fn path_prefix_is_prepended_not_replacing() {
    temp_env::with_var("PATH", Some("/usr/bin"), || {
      let cmd = ToolCommand::new("jpackage", "jpackage").prepend_path("/opt/wix", ';');
      assert_eq!(cmd.child_path(), Some(OsString::from("/opt/wix;/usr/bin")));
    });
  }

  #[test]
  fn no_prefix_leaves_path_alone() {
    let cmd = ToolCommand::new("jlink", "jlink");
    assert_eq!(cmd.child_path(), None);
  }

  #[test]
  fn exit_code_of_terminated_tool() {
    let err = ProcessError::Failed {
      tool: "jlink".into(),
      code: None,
    };
    assert_eq!(err.exit_code(), Some(EXIT_TOOL_TERMINATED));
    assert_eq!(err.to_string(), "jlink failed with exit code none (terminated)");
  }

  #[cfg(unix)]
  #[tokio::test]
  #[serial]
  #[traced_test]
  async fn streams_stdout_and_stderr_to_log() {
    let cmd = shell_tool("tag=from; echo ${tag}-stdout; echo ${tag}-stderr >&2");

    let output = run_tool(&cmd).await.unwrap();

    assert_eq!(output.lines, 2);
    assert!(logs_contain("from-stdout"));
    assert!(logs_contain("from-stderr"));
    assert!(logs_contain("running tool"));
  }

  #[cfg(unix)]
  #[tokio::test]
  #[serial]
  async fn non_zero_exit_carries_code() {
    let cmd = shell_tool("echo about to fail; exit 3");

    let err = run_tool(&cmd).await.unwrap_err();

    assert!(matches!(err, ProcessError::Failed { code: Some(3), .. }));
    assert_eq!(err.exit_code(), Some(3));
  }

  #[cfg(unix)]
  #[tokio::test]
  #[serial]
  async fn verbose_tool_does_not_deadlock() {
    let cmd = shell_tool("i=0; while [ $i -lt 20000 ]; do echo out $i; echo err $i >&2; i=$((i+1)); done");

    let output = run_tool(&cmd).await.unwrap();

    assert_eq!(output.lines, 40000);
  }

  #[cfg(unix)]
  #[tokio::test]
  #[serial]
  #[traced_test]
  async fn invalid_utf8_is_logged_lossily() {
    let cmd = shell_tool("printf 'caf\\351 ok\\n'");

    let output = run_tool(&cmd).await.unwrap();

    assert_eq!(output.lines, 1);
    assert!(logs_contain("caf\u{fffd} ok"));
  }

  #[cfg(unix)]
  #[tokio::test]
  #[serial]
  async fn abandoned_run_kills_tool() {
    let temp = tempfile::TempDir::new().unwrap();
    let marker = temp.path().join("finished");
    let cmd = shell_tool(&format!("sleep 1; touch '{}'", marker.display()));

    let abandoned = tokio::time::timeout(Duration::from_millis(200), run_tool(&cmd)).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(abandoned.is_err());
    assert!(!marker.exists());
  }

  #[tokio::test]
  #[serial]
  async fn missing_program_fails_to_spawn() {
    let cmd = ToolCommand::new("jlink", "/definitely/not/here/jlink");

    let err = run_tool(&cmd).await.unwrap_err();

    assert!(matches!(err, ProcessError::Spawn { .. }));
    assert_eq!(err.exit_code(), None);
  }
}
