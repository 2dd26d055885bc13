//! Shared utilities.
//!
//! Scratch directory allocation, directory ensure, file comparison, hashing
//! and archive extraction.

pub mod archive;
pub mod hash;

#[cfg(test)]
pub mod testutil;

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

/// Allocate a fresh, uniquely named directory inside `parent`.
///
/// The directory is not removed on drop; callers own its cleanup.
pub fn tmp_dir_in(parent: &Path) -> io::Result<PathBuf> {
  let dir = tempfile::Builder::new().tempdir_in(parent)?;
  Ok(dir.keep())
}

/// Create every directory in `dirs` (and its parents) if missing.
pub async fn ensure_dirs<P: AsRef<Path>>(dirs: &[P]) -> io::Result<()> {
  for dir in dirs {
    fs::create_dir_all(dir.as_ref()).await?;
  }
  Ok(())
}

/// Compare the full contents of two files.
pub async fn compare_files(a: &Path, b: &Path) -> io::Result<bool> {
  let left = fs::read(a).await?;
  let right = fs::read(b).await?;
  Ok(left == right)
}

/// Compare two optional artifacts.
///
/// Both present: byte equality. Exactly one present: unequal. Neither
/// present: equal.
pub async fn compare_artifacts(a: &Path, b: &Path) -> io::Result<bool> {
  let a_exists = fs::try_exists(a).await?;
  let b_exists = fs::try_exists(b).await?;

  if a_exists && b_exists {
    compare_files(a, b).await
  } else {
    Ok(a_exists == b_exists)
  }
}
