//! Runtime-binary fetch service.
//!
//! The packaging tool expects prebuilt runtime binaries named
//! `fetched-<version>-<platform>-<arch>` in its cache. `RuntimeFetcher` is
//! the seam for obtaining them; `PkgFetchCli` drives the `pkg-fetch` CLI.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::process::{ToolError, run_tool};
use crate::target::BaseTarget;

/// Errors from the runtime fetch service.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The service reports no binary for the target.
  #[error("no runtime binary available for {target}: {message}")]
  Unavailable { target: String, message: String },

  /// The binary could not be materialized.
  #[error("failed to fetch runtime binary for {target}: {message}")]
  Failed { target: String, message: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Source of target-specific runtime binaries.
#[async_trait]
pub trait RuntimeFetcher: Send + Sync {
  /// Check that a binary exists for `target` without downloading it.
  async fn probe(&self, target: &BaseTarget) -> Result<(), FetchError>;

  /// Materialize the binary for `target` inside `output` and return its path.
  async fn fetch(&self, target: &BaseTarget, output: &Path) -> Result<PathBuf, FetchError>;
}

/// `RuntimeFetcher` backed by the `pkg-fetch` command line tool.
#[derive(Debug, Clone)]
pub struct PkgFetchCli {
  bin: PathBuf,
}

impl PkgFetchCli {
  pub fn new(bin: impl Into<PathBuf>) -> Self {
    Self { bin: bin.into() }
  }

  fn target_args(target: &BaseTarget) -> Vec<String> {
    vec![
      "--node-range".to_string(),
      target.runtime_range.clone(),
      "--platform".to_string(),
      target.platform.clone(),
      "--arch".to_string(),
      target.arch.clone(),
    ]
  }
}

impl Default for PkgFetchCli {
  fn default() -> Self {
    Self::new("pkg-fetch")
  }
}

#[async_trait]
impl RuntimeFetcher for PkgFetchCli {
  async fn probe(&self, target: &BaseTarget) -> Result<(), FetchError> {
    let mut args = Self::target_args(target);
    args.push("--dry-run".to_string());

    run_tool(&self.bin, &args, &BTreeMap::new())
      .await
      .map_err(|e| FetchError::Unavailable {
        target: target.name.clone(),
        message: e.to_string(),
      })?;

    debug!(target = %target.name, "runtime binary available");
    Ok(())
  }

  async fn fetch(&self, target: &BaseTarget, output: &Path) -> Result<PathBuf, FetchError> {
    tokio::fs::create_dir_all(output).await?;

    let mut args = Self::target_args(target);
    args.push("--output".to_string());
    args.push(output.display().to_string());

    let result = run_tool(&self.bin, &args, &BTreeMap::new())
      .await
      .map_err(|e: ToolError| FetchError::Failed {
        target: target.name.clone(),
        message: e.to_string(),
      })?;

    // The last stdout line names the binary; older versions print nothing.
    let stdout = result.stdout_text();
    if let Some(line) = stdout.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
      let printed = PathBuf::from(line);
      if tokio::fs::try_exists(&printed).await? {
        info!(target = %target.name, path = %printed.display(), "runtime binary fetched");
        return Ok(printed);
      }
    }

    let found = find_fetched(output, &target.platform, &target.arch).ok_or_else(|| FetchError::Failed {
      target: target.name.clone(),
      message: format!("no fetched binary under {}", output.display()),
    })?;

    info!(target = %target.name, path = %found.display(), "runtime binary found in cache");
    Ok(found)
  }
}

/// Most recently modified `fetched-*-<platform>-<arch>` file below `dir`.
pub fn find_fetched(dir: &Path, platform: &str, arch: &str) -> Option<PathBuf> {
  let suffix = format!("-{}-{}", platform, arch);

  WalkDir::new(dir)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_file())
    .filter(|entry| {
      let name = entry.file_name().to_string_lossy();
      name.starts_with("fetched-") && name.ends_with(&suffix)
    })
    .max_by_key(|entry| {
      entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .unwrap_or(SystemTime::UNIX_EPOCH)
    })
    .map(|entry| entry.into_path())
}
