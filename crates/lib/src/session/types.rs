//! Session types.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{RuntimeFetcher, ToolSource};
use crate::flags::Flags;
use crate::handler::{HandlerError, ResourceLibrary};
use crate::task::TaskError;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
  /// The guard marker already existed or could not be written.
  #[error("failed to create scratch guard {path}: {source}")]
  GuardCreate {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The guard marker vanished; the scratch root is not ours to delete.
  #[error("scratch guard {0} is missing; refusing to remove scratch root")]
  GuardMissing(PathBuf),

  #[error(transparent)]
  Task(#[from] TaskError),

  #[error(transparent)]
  Handler(#[from] HandlerError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Filesystem roots of a session. All exist once `Session::init` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPaths {
  pub root: PathBuf,
  pub cache: PathBuf,
  /// Runtime-binary cache the fetch service materializes into.
  pub pkg_cache: PathBuf,
  /// Resource templates.
  pub res: PathBuf,
  /// Per-session scratch root.
  pub tmp: PathBuf,
}

/// Source of task ids. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct TaskIds(Arc<AtomicU64>);

impl TaskIds {
  pub fn new() -> Self {
    Self::default()
  }

  /// Next id; the first is 1.
  pub fn next_id(&self) -> u64 {
    self.0.fetch_add(1, Ordering::SeqCst) + 1
  }
}

/// Everything `Session::init` can be configured with.
///
/// Unset paths fall back to the per-user data and cache directories; unset
/// tools are looked up on `PATH`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
  pub flags: Flags,
  pub root: Option<PathBuf>,
  pub cache: Option<PathBuf>,
  pub pkg_cache: Option<PathBuf>,
  pub res: Option<PathBuf>,
  /// Directory the scratch root is created in; the OS temp dir if unset.
  pub tmp_parent: Option<PathBuf>,
  /// ResourceHacker executable; skips the download when set.
  pub rh_bin: Option<PathBuf>,
  pub rh_source: ToolSource,
  pub pkg_bin: Option<PathBuf>,
  pub pkg_fetch_bin: Option<PathBuf>,
  pub rcedit_bin: Option<PathBuf>,
  /// Runtime range `host` resolves to; detected from `node` if unset.
  pub host_runtime: Option<String>,
  #[serde(skip)]
  pub task_ids: Option<TaskIds>,
  #[serde(skip)]
  pub fetcher: Option<Arc<dyn RuntimeFetcher>>,
  #[serde(skip)]
  pub library: Option<Arc<dyn ResourceLibrary>>,
}

impl std::fmt::Debug for SessionOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionOptions")
      .field("flags", &self.flags)
      .field("root", &self.root)
      .field("cache", &self.cache)
      .field("pkg_cache", &self.pkg_cache)
      .field("res", &self.res)
      .field("tmp_parent", &self.tmp_parent)
      .field("rh_bin", &self.rh_bin)
      .field("rh_source", &self.rh_source)
      .field("pkg_bin", &self.pkg_bin)
      .field("pkg_fetch_bin", &self.pkg_fetch_bin)
      .field("rcedit_bin", &self.rcedit_bin)
      .field("host_runtime", &self.host_runtime)
      .field("fetcher", &self.fetcher.is_some())
      .field("library", &self.library.is_some())
      .finish_non_exhaustive()
  }
}

/// Outcome of comparing a built executable against a reference dir.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareReport {
  /// stdout and stderr matched, or the run was skipped.
  pub run: bool,
  pub icon: bool,
  pub rc: bool,
  pub manifest: bool,
  /// All of the above.
  pub all: bool,
}
