//! Handler types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::DownloadError;
use crate::handler::rc::RcData;
use crate::process::ToolError;
use crate::util::archive::ArchiveError;

/// Errors from resource editing.
#[derive(Debug, Error)]
pub enum HandlerError {
  /// The downloaded tool archive does not have the pinned digest.
  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  /// The tool archive could not be downloaded.
  #[error("cannot fetch {url}: {message}")]
  FetchUnavailable { url: String, message: String },

  /// No digest is configured for the archive and hash checks are on.
  #[error("no sha256 pinned for {0}; configure one or skip hash checks")]
  UnpinnedDigest(String),

  #[error("icon not found: {0}")]
  MissingIcon(PathBuf),

  /// The tool was used before `fetch` located it.
  #[error("resource tool not set; fetch it first")]
  ToolNotSet,

  #[error("resource tool failed: {0}")]
  ToolFailed(#[from] ToolError),

  #[error("failed to extract tool archive: {0}")]
  Extract(#[from] ArchiveError),

  /// Explicit arguments were given for the other backend.
  #[error("{handler} handler cannot use {given} arguments")]
  ArgsMismatch { handler: &'static str, given: &'static str },

  /// The resource library reported a failure.
  #[error("resource library failed: {0}")]
  Library(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl From<DownloadError> for HandlerError {
  fn from(err: DownloadError) -> Self {
    match err {
      DownloadError::Unavailable { url, message } => HandlerError::FetchUnavailable { url, message },
      DownloadError::HashMismatch { url, expected, actual } => HandlerError::HashMismatch { url, expected, actual },
      DownloadError::Io(e) => HandlerError::Io(e),
    }
  }
}

/// Caller supplied application metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
  pub name: Option<String>,
  pub version: Option<String>,
  pub description: Option<String>,
  pub legal: Option<String>,
  pub icon: Option<String>,
}

/// Explicit ResourceHacker arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RhArgs {
  pub icon: Option<String>,
  /// Version-info fields rendered into the resource script.
  pub rc_data: Option<RcData>,
  /// Resource script to compile.
  pub rc_file: Option<String>,
  /// Precompiled resource blob, used as is.
  pub res_file: Option<String>,
}

/// Explicit rcedit options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RceditOptions {
  pub file_version: Option<String>,
  pub product_version: Option<String>,
  pub version_string: BTreeMap<String, String>,
  pub icon: Option<String>,
}

/// Explicit handler arguments, one variant per backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerArgs {
  Rh(RhArgs),
  Rcedit(RceditOptions),
}

impl HandlerArgs {
  pub fn kind(&self) -> &'static str {
    match self {
      HandlerArgs::Rh(_) => "rh",
      HandlerArgs::Rcedit(_) => "rcedit",
    }
  }
}
