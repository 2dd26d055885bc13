//! Target types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::BUILT_PREFIX;
use crate::platform::arch::Arch;
use crate::platform::is_patchable;
use crate::platform::os::Os;

/// Errors from target resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetError {
  /// A token of the spec is neither a runtime range, a platform nor an arch.
  #[error("invalid target: {0}")]
  InvalidTarget(String),
}

/// Values a `host` spec (and every omitted token) resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
  pub runtime_range: String,
  pub platform: String,
  pub arch: String,
}

impl HostInfo {
  /// Host info for the running machine with the given runtime range.
  ///
  /// Platforms or architectures unknown to the alias tables fall back to the
  /// raw identifiers Rust reports.
  pub fn detect(runtime_range: impl Into<String>) -> Self {
    Self {
      runtime_range: runtime_range.into(),
      platform: Os::current()
        .map(|os| os.as_str().to_string())
        .unwrap_or_else(|| std::env::consts::OS.to_string()),
      arch: Arch::current()
        .map(|arch| arch.as_str().to_string())
        .unwrap_or_else(|| std::env::consts::ARCH.to_string()),
    }
  }
}

/// A resolved (runtime range, platform, arch) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseTarget {
  pub runtime_range: String,
  pub platform: String,
  pub arch: String,
  /// Always `<runtime_range>-<platform>-<arch>`.
  pub name: String,
  /// The spec string this target was parsed from.
  pub original: String,
}

impl BaseTarget {
  pub fn new(
    runtime_range: impl Into<String>,
    platform: impl Into<String>,
    arch: impl Into<String>,
    original: impl Into<String>,
  ) -> Self {
    let runtime_range = runtime_range.into();
    let platform = platform.into();
    let arch = arch.into();
    let name = format!("{}-{}-{}", runtime_range, platform, arch);

    Self {
      runtime_range,
      platform,
      arch,
      name,
      original: original.into(),
    }
  }

  /// Whether this target's runtime binary gets its resources patched.
  pub fn is_patchable(&self) -> bool {
    is_patchable(&self.platform)
  }
}

/// One build output of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
  #[serde(flatten)]
  pub base: BaseTarget,
  /// Fetched runtime binary in the runtime-binary cache.
  pub full_path: Option<PathBuf>,
  /// Basename of `full_path`.
  pub file_name: Option<String>,
  /// Patched working copy inside the task's scratch dir.
  pub tmp_path: Option<PathBuf>,
  /// Runtime version parsed from the fetched file name, e.g. `v14.20.0`.
  pub version: Option<String>,
}

impl Target {
  pub fn from_base(base: BaseTarget) -> Self {
    Self {
      base,
      full_path: None,
      file_name: None,
      tmp_path: None,
      version: None,
    }
  }

  pub fn name(&self) -> &str {
    &self.base.name
  }

  pub fn is_patchable(&self) -> bool {
    self.base.is_patchable()
  }

  /// Record the fetched runtime binary.
  pub fn set_fetched(&mut self, path: PathBuf) {
    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string());
    self.version = file_name.as_deref().and_then(version_from_file_name);
    self.file_name = file_name;
    self.full_path = Some(path);
  }

  /// Name of the working copy: the fetched name with its first dash
  /// segment replaced by `built`.
  pub fn working_name(&self) -> Option<String> {
    self.file_name.as_deref().map(working_name)
  }

  /// Working copy path, if one was created.
  pub fn tmp_path(&self) -> Option<&Path> {
    self.tmp_path.as_deref()
  }
}

/// `fetched-v14.20.0-win-x64` -> `built-v14.20.0-win-x64`
pub fn working_name(file_name: &str) -> String {
  match file_name.split_once('-') {
    Some((_, rest)) => format!("{}-{}", BUILT_PREFIX, rest),
    None => BUILT_PREFIX.to_string(),
  }
}

/// `fetched-v14.20.0-win-x64` -> `v14.20.0`
fn version_from_file_name(file_name: &str) -> Option<String> {
  file_name
    .split('-')
    .find(|segment| segment.starts_with('v') && segment[1..].starts_with(|c: char| c.is_ascii_digit()))
    .map(str::to_string)
}
