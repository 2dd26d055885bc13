//! rcedit backend.
//!
//! Edits go through a `ResourceLibrary`, so callers can swap the default
//! `rcedit` executable for an in-process implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::handler::{Handler, HandlerArgs, HandlerError, Metadata, RceditOptions, ensure_icon};
use crate::process::run_tool;
use crate::target::Target;

/// In-process seam for applying resource edits to an executable.
#[async_trait]
pub trait ResourceLibrary: Send + Sync {
  async fn edit(&self, exe: &Path, options: &RceditOptions) -> Result<(), HandlerError>;
}

/// `ResourceLibrary` backed by the `rcedit` executable.
#[derive(Debug, Clone)]
pub struct RceditBinary {
  bin: PathBuf,
}

impl RceditBinary {
  pub fn new(bin: impl Into<PathBuf>) -> Self {
    Self { bin: bin.into() }
  }

  pub fn args(exe: &Path, options: &RceditOptions) -> Vec<String> {
    let mut args = vec![exe.display().to_string()];

    for (key, value) in &options.version_string {
      args.extend(["--set-version-string".to_string(), key.clone(), value.clone()]);
    }
    if let Some(version) = &options.file_version {
      args.extend(["--set-file-version".to_string(), version.clone()]);
    }
    if let Some(version) = &options.product_version {
      args.extend(["--set-product-version".to_string(), version.clone()]);
    }
    if let Some(icon) = &options.icon {
      args.extend(["--set-icon".to_string(), icon.clone()]);
    }

    args
  }
}

impl Default for RceditBinary {
  fn default() -> Self {
    Self::new("rcedit")
  }
}

#[async_trait]
impl ResourceLibrary for RceditBinary {
  async fn edit(&self, exe: &Path, options: &RceditOptions) -> Result<(), HandlerError> {
    run_tool(&self.bin, Self::args(exe, options), &BTreeMap::new())
      .await
      .map_err(|e| HandlerError::Library(e.to_string()))?;
    Ok(())
  }
}

/// Handler delegating to a `ResourceLibrary`.
pub struct Rcedit {
  library: Arc<dyn ResourceLibrary>,
  options: RceditOptions,
}

impl Rcedit {
  pub fn new(library: Arc<dyn ResourceLibrary>) -> Self {
    Self {
      library,
      options: RceditOptions::default(),
    }
  }

  /// Options `edit` will apply.
  pub fn options(&self) -> &RceditOptions {
    &self.options
  }

  fn from_metadata(metadata: &Metadata) -> RceditOptions {
    let mut version_string = BTreeMap::new();
    let mut set = |key: &str, value: Option<String>| {
      if let Some(value) = value {
        version_string.insert(key.to_string(), value);
      }
    };
    set("CompanyName", metadata.name.clone());
    set("FileDescription", metadata.description.clone());
    set("LegalCopyright", metadata.legal.clone());
    set("ProductName", metadata.name.as_ref().map(|name| format!("{}.exe", name)));

    RceditOptions {
      file_version: metadata.version.clone(),
      product_version: metadata.version.clone(),
      version_string,
      icon: metadata.icon.clone(),
    }
  }
}

#[async_trait]
impl Handler for Rcedit {
  fn kind(&self) -> &'static str {
    "rcedit"
  }

  async fn fetch(&mut self) -> Result<(), HandlerError> {
    Ok(())
  }

  async fn prepare(&mut self, args: Option<&HandlerArgs>, metadata: Option<&Metadata>) -> Result<(), HandlerError> {
    let options = match args {
      Some(HandlerArgs::Rcedit(options)) => options.clone(),
      Some(other) => {
        return Err(HandlerError::ArgsMismatch {
          handler: self.kind(),
          given: other.kind(),
        });
      }
      None => Self::from_metadata(&metadata.cloned().unwrap_or_default()),
    };

    ensure_icon(options.icon.as_deref().map(Path::new)).await?;

    debug!(options = ?options, "rcedit prepared");
    self.options = options;
    Ok(())
  }

  async fn edit(&self, target: &Target) -> Result<(), HandlerError> {
    if !target.is_patchable() {
      debug!(target = %target.name(), "not patchable, skipping");
      return Ok(());
    }

    let exe = target.tmp_path().ok_or_else(|| {
      std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} has no working copy", target.name()),
      )
    })?;

    self.library.edit(exe, &self.options).await?;
    info!(target = %target.name(), path = %exe.display(), "resources patched");
    Ok(())
  }
}
