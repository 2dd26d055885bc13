//! A single build.
//!
//! A task resolves its target specs, fetches the runtime binaries of the
//! patchable ones, edits working copies of them with the selected handler,
//! runs the packaging tool against those copies and finally removes its
//! scratch directory. Failures are caught once at the task boundary and
//! stored; `Session::exec` surfaces them.

mod types;

pub use types::{PkgArgs, TaskContext, TaskError, TaskOptions, TaskPaths, TaskState};

use std::collections::BTreeMap;
use std::io;

use tokio::fs;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::consts::{NODE_BIN_DIR, PKG_CACHE_ENV, PKG_IGNORE_TAG_ENV};
use crate::flags::Flags;
use crate::handler::{self, Handler, HandlerArgs, Metadata};
use crate::process::run_tool;
use crate::target::{HOST_SPEC, Target, resolve_targets};
use crate::util::{ensure_dirs, tmp_dir_in};

/// One build unit.
pub struct Task {
  id: u64,
  name: String,
  state: TaskState,
  flags: Flags,
  specs: Vec<String>,
  targets: Vec<Target>,
  metadata: Option<Metadata>,
  args: Option<HandlerArgs>,
  pkg: Option<PkgArgs>,
  handler: Box<dyn Handler>,
  paths: Option<TaskPaths>,
  error: Option<TaskError>,
  ctx: TaskContext,
  span: Span,
}

impl std::fmt::Debug for Task {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Task")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("state", &self.state)
      .field("handler", &self.handler.kind())
      .field("specs", &self.specs)
      .field("paths", &self.paths)
      .field("error", &self.error)
      .finish_non_exhaustive()
  }
}

impl Task {
  /// Build a task in the `Ready` state.
  ///
  /// `session_flags` are overridden field by field by the task's own flags;
  /// the handler is picked from the merged `use_rh`.
  pub fn new(id: u64, options: TaskOptions, session_flags: &Flags, mut ctx: TaskContext, parent: &Span) -> Self {
    let flags = session_flags.merge(&options.flags);
    let name = format!("task {}", id);
    let span = info_span!(parent: parent, "task", id, name = %name);

    ctx.handler.skip_hash_checks = flags.skip_hash_checks;
    let handler = handler::select(flags.use_rh, ctx.handler.clone());

    let specs = if options.targets.is_empty() {
      vec![HOST_SPEC.to_string()]
    } else {
      options.targets
    };

    Self {
      id,
      name,
      state: TaskState::Ready,
      flags,
      specs,
      targets: Vec::new(),
      metadata: options.metadata,
      args: options.args,
      pkg: options.pkg,
      handler,
      paths: None,
      error: None,
      ctx,
      span,
    }
  }

  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn state(&self) -> TaskState {
    self.state
  }

  pub fn flags(&self) -> &Flags {
    &self.flags
  }

  /// Target specs as submitted, `host` if none were.
  pub fn specs(&self) -> &[String] {
    &self.specs
  }

  /// Resolved targets. Filled while running.
  pub fn targets(&self) -> &[Target] {
    &self.targets
  }

  pub fn paths(&self) -> Option<&TaskPaths> {
    self.paths.as_ref()
  }

  pub fn handler_kind(&self) -> &'static str {
    self.handler.kind()
  }

  /// Error the task ended with.
  pub fn error(&self) -> Option<&TaskError> {
    self.error.as_ref()
  }

  pub(crate) fn take_error(&mut self) -> Option<TaskError> {
    self.error.take()
  }

  /// Run the task to a terminal state. Never fails; a failure is stored
  /// and readable through `error`.
  pub async fn run(&mut self) {
    let span = self.span.clone();
    self.run_in_span().instrument(span).await
  }

  async fn run_in_span(&mut self) {
    if self.state.is_terminal() {
      warn!(state = %self.state, "task already ran");
      return;
    }

    self.state = TaskState::Running;
    info!(targets = %self.specs.join(" | "), handler = self.handler.kind(), "running");

    match self.steps().await {
      Ok(()) => {
        self.state = TaskState::Finished;
        info!("finished");
      }
      Err(err) => {
        error!(error = %err, "task failed");
        if let Err(cleanup_err) = self.cleanup().await {
          warn!(error = %cleanup_err, "cleanup after failure failed");
        }
        self.error = Some(err);
        self.state = TaskState::Error;
      }
    }
  }

  async fn steps(&mut self) -> Result<(), TaskError> {
    if let Some(pkg) = &self.pkg {
      pkg.validate()?;
    }

    let tmp = tmp_dir_in(&self.ctx.session_tmp)?;
    let node_bin = tmp.join(NODE_BIN_DIR);
    ensure_dirs(&[&tmp, &node_bin]).await?;
    debug!(tmp = %tmp.display(), "scratch dir allocated");
    self.paths = Some(TaskPaths { tmp, node_bin });

    self.fetch_binaries().await?;
    self.edit().await?;
    self.run_pkg().await?;
    self.cleanup().await
  }

  /// Resolve targets, fetch the handler's tool and the runtime binaries of
  /// every patchable target.
  async fn fetch_binaries(&mut self) -> Result<(), TaskError> {
    let bases = resolve_targets(&self.specs, &self.ctx.host)?;

    debug!(handler = self.handler.kind(), "fetching handler tool");
    self.handler.fetch().await?;

    for base in bases {
      let mut target = Target::from_base(base);

      if target.is_patchable() {
        self.ctx.fetcher.probe(&target.base).await?;
        let path = self.ctx.fetcher.fetch(&target.base, &self.ctx.pkg_cache).await?;
        debug!(target = %target.name(), path = %path.display(), "runtime binary ready");
        target.set_fetched(path);
      } else {
        debug!(target = %target.name(), "not patchable, no runtime binary needed");
      }

      self.targets.push(target);
    }

    Ok(())
  }

  /// Prepare the handler, then copy and edit every patchable target.
  async fn edit(&mut self) -> Result<(), TaskError> {
    self.handler.prepare(self.args.as_ref(), self.metadata.as_ref()).await?;

    let Some(paths) = &self.paths else {
      return Ok(());
    };

    for target in &mut self.targets {
      if !target.is_patchable() {
        continue;
      }

      let (Some(source), Some(working_name)) = (target.full_path.clone(), target.working_name()) else {
        continue;
      };

      let working_copy = paths.node_bin.join(working_name);
      fs::copy(&source, &working_copy).await?;
      target.tmp_path = Some(working_copy);

      self.handler.edit(target).await?;
    }

    Ok(())
  }

  /// Invoke the packaging tool, if packaging was requested.
  async fn run_pkg(&self) -> Result<(), TaskError> {
    let (Some(pkg), Some(paths)) = (&self.pkg, &self.paths) else {
      debug!("no packaging requested");
      return Ok(());
    };

    let argv = pkg.to_argv(&self.specs)?;
    let env = BTreeMap::from([
      (PKG_CACHE_ENV.to_string(), paths.node_bin.display().to_string()),
      (PKG_IGNORE_TAG_ENV.to_string(), "true".to_string()),
    ]);

    info!(pkg = %self.ctx.pkg_bin.display(), args = ?argv, "packaging");
    let output = run_tool(&self.ctx.pkg_bin, &argv, &env)
      .await
      .map_err(TaskError::PackagingFailed)?;
    debug!(stdout = %output.stdout_text(), "packaging done");

    Ok(())
  }

  /// Remove the scratch dir. Only ever touches a dir strictly inside the
  /// session scratch root.
  pub async fn cleanup(&self) -> Result<(), TaskError> {
    if self.flags.keep_tmp {
      debug!("keep_tmp set, leaving scratch dir");
      return Ok(());
    }

    let Some(paths) = &self.paths else {
      return Ok(());
    };

    if !paths.tmp.starts_with(&self.ctx.session_tmp) || paths.tmp == self.ctx.session_tmp {
      warn!(tmp = %paths.tmp.display(), "scratch dir outside session root, not removing");
      return Ok(());
    }

    match fs::remove_dir_all(&paths.tmp).await {
      Ok(()) => {
        debug!(tmp = %paths.tmp.display(), "scratch dir removed");
        Ok(())
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}
