//! Resource editing backends.
//!
//! A `Handler` patches the PE resources (version info, icon) of a target's
//! working copy. Two backends exist:
//! - `ResourceHacker`: drives the ResourceHacker CLI, downloading and
//!   verifying it on first use
//! - `Rcedit`: hands the edit to a `ResourceLibrary`
//!
//! Both skip targets whose platform carries no patchable resources.

pub mod rc;
pub mod rcedit;
pub mod rh;
mod types;

pub use rc::RcData;
pub use rcedit::{Rcedit, RceditBinary, ResourceLibrary};
pub use rh::{ResourceHacker, RhOpts};
pub use types::{HandlerArgs, HandlerError, Metadata, RceditOptions, RhArgs};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::fetch::ToolSource;
use crate::target::Target;

/// Capability contract shared by every resource-editing backend.
#[async_trait]
pub trait Handler: Send + Sync {
  /// Short backend name, for logs.
  fn kind(&self) -> &'static str;

  /// Acquire or validate the backend's tool. Idempotent.
  async fn fetch(&mut self) -> Result<(), HandlerError>;

  /// Compute edit parameters. Explicit `args` are used verbatim and
  /// `metadata` is then ignored; otherwise everything derives from
  /// `metadata`.
  async fn prepare(&mut self, args: Option<&HandlerArgs>, metadata: Option<&Metadata>) -> Result<(), HandlerError>;

  /// Apply the prepared parameters to the target's working copy.
  async fn edit(&self, target: &Target) -> Result<(), HandlerError>;
}

/// What a handler needs from its session and task.
#[derive(Clone)]
pub struct HandlerContext {
  /// Process-wide cache; ResourceHacker lives in `cache/rh`.
  pub cache: PathBuf,
  /// Resource directory holding an optional script template.
  pub res: PathBuf,
  /// Directory scratch dirs are allocated in.
  pub tmp: PathBuf,
  pub skip_hash_checks: bool,
  /// Explicit ResourceHacker executable, trusted as is.
  pub rh_path: Option<PathBuf>,
  pub rh_source: ToolSource,
  pub library: Arc<dyn ResourceLibrary>,
}

impl std::fmt::Debug for HandlerContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HandlerContext")
      .field("cache", &self.cache)
      .field("res", &self.res)
      .field("tmp", &self.tmp)
      .field("skip_hash_checks", &self.skip_hash_checks)
      .field("rh_path", &self.rh_path)
      .field("rh_source", &self.rh_source)
      .finish_non_exhaustive()
  }
}

/// Pick the backend for a task.
pub fn select(use_rh: bool, ctx: HandlerContext) -> Box<dyn Handler> {
  if use_rh {
    Box::new(ResourceHacker::new(ctx))
  } else {
    Box::new(Rcedit::new(ctx.library))
  }
}

/// Absolute form of a caller supplied path.
pub(crate) fn absolute(path: impl AsRef<Path>) -> Result<PathBuf, HandlerError> {
  Ok(std::path::absolute(path.as_ref())?)
}

/// Fail with `MissingIcon` unless `icon` exists.
pub(crate) async fn ensure_icon(icon: Option<&Path>) -> Result<(), HandlerError> {
  if let Some(icon) = icon
    && !tokio::fs::try_exists(icon).await?
  {
    return Err(HandlerError::MissingIcon(icon.to_path_buf()));
  }
  Ok(())
}
