//! ResourceHacker backend.
//!
//! ResourceHacker is a Windows CLI taking `-open`, `-action`, `-save`,
//! `-resource` and `-mask`. It is resolved in order from an explicit path,
//! the cache, or a verified download of the release archive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::fetch::download_verified;
use crate::handler::rc::{self, RcData};
use crate::handler::{Handler, HandlerArgs, HandlerContext, HandlerError, Metadata, absolute, ensure_icon};
use crate::process::{ToolOutput, run_tool};
use crate::target::Target;
use crate::util::archive::extract_zip;
use crate::util::tmp_dir_in;

/// Cache subdirectory holding the extracted tool.
pub const RH_CACHE_DIR: &str = "rh";
pub const RH_ARCHIVE_NAME: &str = "rh.zip";
pub const RH_EXE_NAME: &str = "ResourceHacker.exe";

/// Mask selecting the main icon group.
const ICON_MASK: &str = "ICONGROUP,1,";
/// Mask selecting every resource.
const ALL_MASK: &str = ",,,";

/// One ResourceHacker invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RhOpts {
  pub open: Option<PathBuf>,
  pub action: Option<String>,
  pub save: Option<PathBuf>,
  pub resource: Option<PathBuf>,
  pub mask: Option<String>,
}

impl RhOpts {
  /// `-key value` for each present option, in fixed order.
  pub fn to_args(&self) -> Vec<String> {
    let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

    [
      ("open", path(&self.open)),
      ("action", self.action.clone()),
      ("save", path(&self.save)),
      ("resource", path(&self.resource)),
      ("mask", self.mask.clone()),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| [format!("-{}", key), v]))
    .flatten()
    .collect()
  }
}

/// Handler driving the ResourceHacker CLI.
#[derive(Debug)]
pub struct ResourceHacker {
  ctx: HandlerContext,
  tool: Option<PathBuf>,
  res_file: Option<PathBuf>,
  icon: Option<PathBuf>,
}

impl ResourceHacker {
  pub fn new(ctx: HandlerContext) -> Self {
    Self {
      ctx,
      tool: None,
      res_file: None,
      icon: None,
    }
  }

  /// Tool path located by `fetch`.
  pub fn tool(&self) -> Option<&Path> {
    self.tool.as_deref()
  }

  /// Resource blob `edit` will apply.
  pub fn res_file(&self) -> Option<&Path> {
    self.res_file.as_deref()
  }

  /// Icon `edit` will apply.
  pub fn icon(&self) -> Option<&Path> {
    self.icon.as_deref()
  }

  pub fn cache_dir(&self) -> PathBuf {
    self.ctx.cache.join(RH_CACHE_DIR)
  }

  /// Run the tool once.
  pub async fn exec(&self, opts: &RhOpts) -> Result<ToolOutput, HandlerError> {
    let tool = self.tool.as_deref().ok_or(HandlerError::ToolNotSet)?;
    let args = opts.to_args();
    debug!(args = ?args, "ResourceHacker");
    Ok(run_tool(tool, &args, &BTreeMap::new()).await?)
  }

  /// Compile a resource script into a `.res` blob next to it.
  pub async fn compile(&self, rc_file: &Path) -> Result<PathBuf, HandlerError> {
    let res_file = rc_file.with_extension("res");

    self
      .exec(&RhOpts {
        open: Some(rc_file.to_path_buf()),
        save: Some(res_file.clone()),
        action: Some("compile".to_string()),
        ..Default::default()
      })
      .await?;

    debug!(rc = %rc_file.display(), res = %res_file.display(), "compiled resource script");
    Ok(res_file)
  }

  /// Render `data` into a fresh scratch dir and compile it.
  async fn compile_data(&self, data: &RcData) -> Result<PathBuf, HandlerError> {
    let template = rc::load_template(&self.ctx.res).await?;
    let rendered = rc::render(&template, data);

    tokio::fs::create_dir_all(&self.ctx.tmp).await?;
    let dir = tmp_dir_in(&self.ctx.tmp)?;
    let rc_file = dir.join("version_info.rc");
    tokio::fs::write(&rc_file, rendered).await?;

    self.compile(&rc_file).await
  }

  /// Dump every resource of `exe` into `dir`, with the script at
  /// `dir/dialog.rc`.
  pub async fn extract(&self, exe: &Path, dir: &Path) -> Result<(), HandlerError> {
    self
      .exec(&RhOpts {
        open: Some(exe.to_path_buf()),
        action: Some("extract".to_string()),
        mask: Some(ALL_MASK.to_string()),
        save: Some(dir.join("dialog.rc")),
        ..Default::default()
      })
      .await?;
    Ok(())
  }

  /// Download, verify and unpack the release archive into the cache.
  async fn download(&self) -> Result<PathBuf, HandlerError> {
    let source = &self.ctx.rh_source;
    let expected = if self.ctx.skip_hash_checks {
      warn!(url = %source.url, "skipping ResourceHacker hash check");
      None
    } else {
      Some(
        source
          .sha256
          .as_deref()
          .ok_or_else(|| HandlerError::UnpinnedDigest(source.url.clone()))?,
      )
    };

    let cache_dir = self.cache_dir();
    let archive = cache_dir.join(RH_ARCHIVE_NAME);
    download_verified(&source.url, &archive, expected).await?;

    let dest = cache_dir.clone();
    tokio::task::spawn_blocking(move || extract_zip(&archive, &dest))
      .await
      .map_err(std::io::Error::other)??;

    let exe = cache_dir.join(RH_EXE_NAME);
    if !tokio::fs::try_exists(&exe).await? {
      return Err(HandlerError::FetchUnavailable {
        url: source.url.clone(),
        message: format!("archive has no {}", RH_EXE_NAME),
      });
    }

    info!(path = %exe.display(), "ResourceHacker installed");
    Ok(exe)
  }

  async fn add_overwrite(&self, exe: &Path, resource: &Path, mask: Option<&str>) -> Result<(), HandlerError> {
    self
      .exec(&RhOpts {
        open: Some(exe.to_path_buf()),
        save: Some(exe.to_path_buf()),
        action: Some("addoverwrite".to_string()),
        resource: Some(resource.to_path_buf()),
        mask: mask.map(str::to_string),
      })
      .await?;
    Ok(())
  }
}

#[async_trait]
impl Handler for ResourceHacker {
  fn kind(&self) -> &'static str {
    "rh"
  }

  async fn fetch(&mut self) -> Result<(), HandlerError> {
    if self.tool.is_some() {
      return Ok(());
    }

    if let Some(path) = &self.ctx.rh_path {
      let path = absolute(path)?;
      debug!(path = %path.display(), "using configured ResourceHacker");
      self.tool = Some(path);
      return Ok(());
    }

    let cached = self.cache_dir().join(RH_EXE_NAME);
    if tokio::fs::try_exists(&cached).await? {
      debug!(path = %cached.display(), "using cached ResourceHacker");
      self.tool = Some(cached);
      return Ok(());
    }

    self.tool = Some(self.download().await?);
    Ok(())
  }

  async fn prepare(&mut self, args: Option<&HandlerArgs>, metadata: Option<&Metadata>) -> Result<(), HandlerError> {
    match args {
      Some(HandlerArgs::Rh(args)) => {
        self.icon = args.icon.as_ref().map(PathBuf::from);
        self.res_file = if let Some(res_file) = &args.res_file {
          Some(absolute(res_file)?)
        } else if let Some(rc_file) = &args.rc_file {
          Some(self.compile(&absolute(rc_file)?).await?)
        } else if let Some(data) = &args.rc_data {
          Some(self.compile_data(data).await?)
        } else {
          None
        };
      }
      Some(other) => {
        return Err(HandlerError::ArgsMismatch {
          handler: self.kind(),
          given: other.kind(),
        });
      }
      None => {
        let metadata = metadata.cloned().unwrap_or_default();
        self.icon = metadata.icon.as_ref().map(absolute).transpose()?;
        self.res_file = Some(self.compile_data(&RcData::from_metadata(&metadata)).await?);
      }
    }

    ensure_icon(self.icon.as_deref()).await
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

    if let Some(res_file) = &self.res_file {
      self.add_overwrite(exe, res_file, None).await?;
    }
    if let Some(icon) = &self.icon {
      self.add_overwrite(exe, icon, Some(ICON_MASK)).await?;
    }

    info!(target = %target.name(), path = %exe.display(), "resources patched");
    Ok(())
  }
}
