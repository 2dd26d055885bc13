//! Sessions.
//!
//! A session owns the shared filesystem roots (cache, runtime-binary cache,
//! resources and a per-session scratch root), the merged defaults for every
//! task, and the task id generator. The scratch root carries a guard marker
//! `.<session-id>`; cleanup refuses to delete a root whose marker is gone.

pub mod compare;
mod types;

pub use types::{CompareReport, SessionError, SessionOptions, SessionPaths, TaskIds};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{Instrument, Span, debug, info, info_span, warn};
use uuid::Uuid;

use crate::consts::TMP_PREFIX;
use crate::fetch::{PkgFetchCli, RuntimeFetcher};
use crate::flags::Flags;
use crate::handler::{Handler, HandlerContext, RceditBinary, ResourceHacker, ResourceLibrary};
use crate::platform::paths::{root_dir, shared_cache_dir};
use crate::process::run_tool;
use crate::target::HostInfo;
use crate::task::{Task, TaskContext, TaskOptions};
use crate::util::{ensure_dirs, tmp_dir_in};

/// Runtime range used when none is configured and `node` can't be asked.
pub const FALLBACK_RUNTIME: &str = "latest";

/// Shared configuration and roots for any number of tasks.
pub struct Session {
  id: Uuid,
  flags: Flags,
  paths: SessionPaths,
  guard: PathBuf,
  host: HostInfo,
  task_ids: TaskIds,
  pkg_bin: PathBuf,
  fetcher: Arc<dyn RuntimeFetcher>,
  handler_ctx: HandlerContext,
  span: Span,
}

impl std::fmt::Debug for Session {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session")
      .field("id", &self.id)
      .field("flags", &self.flags)
      .field("paths", &self.paths)
      .field("host", &self.host)
      .finish_non_exhaustive()
  }
}

impl Session {
  /// Set up roots and the guarded scratch root.
  pub async fn init(options: SessionOptions) -> Result<Session, SessionError> {
    let id = Uuid::new_v4();
    let span = info_span!("session", id = %id);
    Self::init_in_span(id, options, span.clone()).instrument(span).await
  }

  async fn init_in_span(id: Uuid, options: SessionOptions, span: Span) -> Result<Session, SessionError> {
    let root = options.root.unwrap_or_else(root_dir);
    let cache = options.cache.unwrap_or_else(shared_cache_dir);
    let pkg_cache = options.pkg_cache.unwrap_or_else(|| cache.join("pkg-cache"));
    let res = options.res.unwrap_or_else(|| root.join("res"));

    let tmp_parent = options.tmp_parent.unwrap_or_else(std::env::temp_dir);
    fs::create_dir_all(&tmp_parent).await?;
    let tmp = tempfile::Builder::new().prefix(TMP_PREFIX).tempdir_in(&tmp_parent)?.keep();
    let tmp = dunce::canonicalize(&tmp)?;

    let paths = SessionPaths {
      root,
      cache,
      pkg_cache,
      res,
      tmp,
    };
    ensure_dirs(&[&paths.root, &paths.cache, &paths.pkg_cache, &paths.res, &paths.tmp]).await?;

    let guard = paths.tmp.join(format!(".{}", id));
    create_guard(&guard).await?;

    let host_runtime = match options.host_runtime {
      Some(range) => range,
      None => detect_host_runtime().await,
    };
    let host = HostInfo::detect(host_runtime);

    let fetcher: Arc<dyn RuntimeFetcher> = match options.fetcher {
      Some(fetcher) => fetcher,
      None => Arc::new(PkgFetchCli::new(options.pkg_fetch_bin.unwrap_or_else(|| "pkg-fetch".into()))),
    };
    let library: Arc<dyn ResourceLibrary> = match options.library {
      Some(library) => library,
      None => Arc::new(RceditBinary::new(options.rcedit_bin.unwrap_or_else(|| "rcedit".into()))),
    };

    let handler_ctx = HandlerContext {
      cache: paths.cache.clone(),
      res: paths.res.clone(),
      tmp: paths.tmp.clone(),
      skip_hash_checks: options.flags.skip_hash_checks,
      rh_path: options.rh_bin,
      rh_source: options.rh_source,
      library,
    };

    info!(tmp = %paths.tmp.display(), cache = %paths.cache.display(), host = ?host, "session ready");

    Ok(Session {
      id,
      flags: options.flags,
      paths,
      guard,
      host,
      task_ids: options.task_ids.unwrap_or_default(),
      pkg_bin: options.pkg_bin.unwrap_or_else(|| "pkg".into()),
      fetcher,
      handler_ctx,
      span,
    })
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn flags(&self) -> &Flags {
    &self.flags
  }

  pub fn paths(&self) -> &SessionPaths {
    &self.paths
  }

  pub fn host(&self) -> &HostInfo {
    &self.host
  }

  pub fn guard_path(&self) -> &Path {
    &self.guard
  }

  /// Build a task bound to this session without running it.
  pub fn task(&self, options: TaskOptions) -> Task {
    let ctx = TaskContext {
      session_tmp: self.paths.tmp.clone(),
      pkg_cache: self.paths.pkg_cache.clone(),
      pkg_bin: self.pkg_bin.clone(),
      host: self.host.clone(),
      fetcher: self.fetcher.clone(),
      handler: self.handler_ctx.clone(),
    };
    Task::new(self.task_ids.next_id(), options, &self.flags, ctx, &self.span)
  }

  /// Build and run a task. Returns the task's error if it ended in the
  /// error state.
  pub async fn exec(&self, options: TaskOptions) -> Result<Task, SessionError> {
    let mut task = self.task(options);
    task.run().await;

    async {
      debug!(task = %task.name(), state = %task.state(), "task ended");
      match task.take_error() {
        Some(err) => Err(err.into()),
        None => Ok(task),
      }
    }
    .instrument(self.span.clone())
    .await
  }

  /// Remove the scratch root. Refuses if the guard marker is gone.
  pub async fn cleanup(&self) -> Result<(), SessionError> {
    if self.flags.keep_tmp {
      debug!(parent: &self.span, "keep_tmp set, leaving scratch root");
      return Ok(());
    }

    if !fs::try_exists(&self.guard).await? {
      warn!(parent: &self.span, guard = %self.guard.display(), "guard missing");
      return Err(SessionError::GuardMissing(self.guard.clone()));
    }

    fs::remove_dir_all(&self.paths.tmp).await?;
    info!(parent: &self.span, tmp = %self.paths.tmp.display(), "scratch root removed");
    Ok(())
  }

  /// Compare a built executable with a reference directory.
  ///
  /// With `run` unset the run check passes without executing `exe`.
  pub async fn compare(&self, exe: &Path, reference_dir: &Path, run: bool) -> Result<CompareReport, SessionError> {
    async {
      let mut rh = ResourceHacker::new(self.handler_ctx.clone());
      rh.fetch().await?;

      let scratch = tmp_dir_in(&self.paths.tmp)?;
      let result = self.compare_in(&rh, exe, reference_dir, run, &scratch).await;

      if !self.flags.keep_tmp
        && let Err(e) = fs::remove_dir_all(&scratch).await
      {
        warn!(error = %e, "failed to remove compare scratch dir");
      }

      let report = result?;
      info!(exe = %exe.display(), all = report.all, "compared");
      Ok(report)
    }
    .instrument(self.span.clone())
    .await
  }

  async fn compare_in(
    &self,
    rh: &ResourceHacker,
    exe: &Path,
    reference_dir: &Path,
    run: bool,
    scratch: &Path,
  ) -> Result<CompareReport, SessionError> {
    let run_ok = if run {
      compare::run_matches(exe, reference_dir).await?
    } else {
      debug!("run check skipped");
      true
    };

    rh.extract(exe, scratch).await?;
    Ok(compare::compare_resources(run_ok, scratch, reference_dir).await?)
  }
}

/// Create `path`, failing if it already exists.
async fn create_guard(path: &Path) -> Result<(), SessionError> {
  fs::OpenOptions::new()
    .write(true)
    .create_new(true)
    .open(path)
    .await
    .map_err(|source| SessionError::GuardCreate {
      path: path.to_path_buf(),
      source,
    })?;
  debug!(guard = %path.display(), "guard created");
  Ok(())
}

/// `node<major>` of the `node` on `PATH`, or `latest`.
pub async fn detect_host_runtime() -> String {
  match run_tool(Path::new("node"), ["--version"], &BTreeMap::new()).await {
    Ok(output) => runtime_range_from_version(&output.stdout_text()).unwrap_or_else(|| FALLBACK_RUNTIME.to_string()),
    Err(e) => {
      debug!(error = %e, "no host node, using {}", FALLBACK_RUNTIME);
      FALLBACK_RUNTIME.to_string()
    }
  }
}

/// `v18.17.0` -> `node18`
fn runtime_range_from_version(version: &str) -> Option<String> {
  let version = semver::Version::parse(version.trim().trim_start_matches('v')).ok()?;
  Some(format!("node{}", version.major))
}

/// Initialize a session and run one task on it.
pub async fn exec(session_options: SessionOptions, task_options: TaskOptions) -> Result<(Session, Task), SessionError> {
  let session = Session::init(session_options).await?;
  let task = session.exec(task_options).await?;
  Ok((session, task))
}
