//! Task types.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{FetchError, RuntimeFetcher};
use crate::flags::FlagOverrides;
use crate::handler::{HandlerArgs, HandlerContext, HandlerError, Metadata};
use crate::process::ToolError;
use crate::target::{HostInfo, TargetError};

/// Errors a task can end with.
#[derive(Debug, Error)]
pub enum TaskError {
  #[error(transparent)]
  Target(#[from] TargetError),

  #[error(transparent)]
  Handler(#[from] HandlerError),

  #[error(transparent)]
  Fetch(#[from] FetchError),

  /// Packaging was requested without a source.
  #[error("no source specified for packaging")]
  MissingBuildSource,

  /// Packaging was requested without `out` or `out_dir`.
  #[error("no output path specified for packaging")]
  MissingBuildOutput,

  #[error("packaging failed: {0}")]
  PackagingFailed(#[source] ToolError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Lifecycle of a task. `Finished` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
  Ready,
  Running,
  Finished,
  Error,
}

impl TaskState {
  pub fn is_terminal(self) -> bool {
    matches!(self, TaskState::Finished | TaskState::Error)
  }
}

impl std::fmt::Display for TaskState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      TaskState::Ready => "ready",
      TaskState::Running => "running",
      TaskState::Finished => "finished",
      TaskState::Error => "error",
    };
    write!(f, "{}", s)
  }
}

/// Arguments for the packaging tool.
///
/// A JSON array is passed through verbatim; an object is expanded into
/// `--build`, `--target` and `--output`/`--out-path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PkgArgs {
  Raw(Vec<String>),
  #[serde(rename_all = "camelCase")]
  Simple {
    #[serde(default)]
    src: Option<String>,
    #[serde(default)]
    out: Option<String>,
    #[serde(default)]
    out_dir: Option<String>,
  },
}

impl PkgArgs {
  /// Structural check, done before anything touches the filesystem.
  pub fn validate(&self) -> Result<(), TaskError> {
    self.to_argv(&[]).map(|_| ())
  }

  /// Packaging tool argv. `specs` are the task's unparsed target specs.
  ///
  /// Empty strings count as absent.
  pub fn to_argv(&self, specs: &[String]) -> Result<Vec<String>, TaskError> {
    match self {
      PkgArgs::Raw(args) => Ok(args.clone()),
      PkgArgs::Simple { src, out, out_dir } => {
        let src = non_empty(src).ok_or(TaskError::MissingBuildSource)?;
        let (flag, path) = match (non_empty(out), non_empty(out_dir)) {
          (Some(out), _) => ("--output", out),
          (None, Some(dir)) => ("--out-path", dir),
          (None, None) => return Err(TaskError::MissingBuildOutput),
        };

        Ok(vec![
          "--build".to_string(),
          src.to_string(),
          "--target".to_string(),
          specs.join(","),
          flag.to_string(),
          path.to_string(),
        ])
      }
    }
  }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}

/// What a caller submits to `Session::exec`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskOptions {
  /// Target specs; empty means `host`.
  pub targets: Vec<String>,
  pub metadata: Option<Metadata>,
  /// Explicit handler arguments; replace `metadata` entirely.
  pub args: Option<HandlerArgs>,
  pub pkg: Option<PkgArgs>,
  pub flags: FlagOverrides,
}

/// Scratch paths of a running task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPaths {
  /// Scratch dir inside the session scratch root.
  pub tmp: PathBuf,
  /// Patched runtime binaries; handed to the packaging tool as its cache.
  pub node_bin: PathBuf,
}

/// Session state a task runs against.
#[derive(Clone)]
pub struct TaskContext {
  pub session_tmp: PathBuf,
  pub pkg_cache: PathBuf,
  pub pkg_bin: PathBuf,
  pub host: HostInfo,
  pub fetcher: Arc<dyn RuntimeFetcher>,
  pub handler: HandlerContext,
}
