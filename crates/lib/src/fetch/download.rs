//! Verified archive download.
//!
//! The response body is streamed into a temporary file next to the
//! destination while a SHA-256 digest is accumulated. The file only reaches
//! its final path after the digest has been confirmed, so nothing downstream
//! (extraction in particular) ever sees unverified bytes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::RH_SHA256_ENV;
use crate::util::hash::{ContentHash, write_hashed};

/// ResourceHacker release archive.
pub const RH_ARCHIVE_URL: &str = "https://www.angusj.com/resourcehacker/resource_hacker.zip";

/// Where a tool archive comes from and the digest it must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSource {
  pub url: String,
  /// Expected SHA-256 of the archive (lowercase hex). The default source
  /// takes it from `EXEFORGE_RH_SHA256`.
  pub sha256: Option<String>,
}

impl Default for ToolSource {
  fn default() -> Self {
    Self {
      url: RH_ARCHIVE_URL.to_string(),
      sha256: std::env::var(RH_SHA256_ENV)
        .ok()
        .map(|digest| digest.trim().to_lowercase())
        .filter(|digest| !digest.is_empty()),
    }
  }
}

/// Errors from a verified download.
#[derive(Debug, Error)]
pub enum DownloadError {
  /// The request failed or the response carried no usable body.
  #[error("cannot fetch {url}: {message}")]
  Unavailable { url: String, message: String },

  /// SHA-256 mismatch after download.
  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Download `url` to `dest`.
///
/// With `expected_sha256` set, the computed digest must match before the
/// file is moved to `dest`; on mismatch the partial file is discarded and
/// `dest` is left untouched. Without it the digest is computed but not
/// checked.
pub async fn download_verified(
  url: &str,
  dest: &Path,
  expected_sha256: Option<&str>,
) -> Result<ContentHash, DownloadError> {
  info!(url = %url, "fetching archive");

  let unavailable = |message: String| DownloadError::Unavailable {
    url: url.to_string(),
    message,
  };

  let response = reqwest::get(url).await.map_err(|e| unavailable(e.to_string()))?;

  if !response.status().is_success() {
    return Err(unavailable(format!("HTTP {}", response.status())));
  }

  let dir = dest.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
  tokio::fs::create_dir_all(&dir).await?;
  let staged = tempfile::NamedTempFile::new_in(&dir)?.into_temp_path();

  let (actual, written) = write_hashed(response.bytes_stream(), &staged).await?;

  if written == 0 {
    return Err(unavailable("response carried no body".to_string()));
  }

  if let Some(expected) = expected_sha256 {
    if !actual.matches(expected) {
      return Err(DownloadError::HashMismatch {
        url: url.to_string(),
        expected: expected.to_string(),
        actual: actual.0,
      });
    }
    debug!(hash = %actual, "archive hash verified");
  }

  staged.persist(dest).map_err(|e| e.error)?;

  info!(path = %dest.display(), size = written, "download complete");
  Ok(actual)
}
