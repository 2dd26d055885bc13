//! External tool invocation.
//!
//! Every collaborator that lives outside the process (ResourceHacker, rcedit,
//! pkg, pkg-fetch) is driven through `run_tool`. Tools are executed directly,
//! never through a shell, and inherit the caller's environment plus any
//! explicit overrides.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
  /// The tool could not be started.
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The tool ran and exited unsuccessfully.
  #[error("{program} exited with code {code:?}: {stderr}")]
  Failed {
    program: PathBuf,
    code: Option<i32>,
    stderr: String,
  },
}

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
}

impl ToolOutput {
  /// Stdout as trimmed, lossily decoded text.
  pub fn stdout_text(&self) -> String {
    String::from_utf8_lossy(&self.stdout).trim().to_string()
  }
}

/// Run `program` with `args` and the given environment overrides.
///
/// Succeeds only if the tool exits with status zero.
pub async fn run_tool<I, S>(program: &Path, args: I, env: &BTreeMap<String, String>) -> Result<ToolOutput, ToolError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<OsStr>,
{
  let mut command = Command::new(program);
  command.args(args).envs(env).kill_on_drop(true);

  debug!(program = %program.display(), "spawning tool");

  let output = command.output().await.map_err(|source| ToolError::Spawn {
    program: program.to_path_buf(),
    source,
  })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "tool stdout");
    }
    return Err(ToolError::Failed {
      program: program.to_path_buf(),
      code: output.status.code(),
      stderr,
    });
  }

  Ok(ToolOutput {
    stdout: output.stdout,
    stderr: output.stderr,
  })
}
