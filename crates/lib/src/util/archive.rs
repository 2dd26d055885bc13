//! Zip archive extraction.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors during archive extraction.
#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("failed to open zip {path}: {message}")]
  Open { path: PathBuf, message: String },

  #[error("failed to read zip entry {index}: {message}")]
  Entry { index: usize, message: String },

  #[error("zip entry has an unsafe name: {0}")]
  UnsafeName(String),

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// Extract every entry of the zip at `archive_path` into `dest`.
///
/// Entries keep their relative paths. Each file is written to a temporary
/// sibling first and renamed into place, so concurrent extractions of the
/// same archive never observe a half-written file.
///
/// Returns the paths of the extracted files.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
  let file = File::open(archive_path)?;
  let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| ArchiveError::Open {
    path: archive_path.to_path_buf(),
    message: e.to_string(),
  })?;

  fs::create_dir_all(dest)?;
  let mut extracted = Vec::new();

  for index in 0..archive.len() {
    let mut entry = archive.by_index(index).map_err(|e| ArchiveError::Entry {
      index,
      message: e.to_string(),
    })?;

    let relative = entry
      .enclosed_name()
      .ok_or_else(|| ArchiveError::UnsafeName(entry.name().to_string()))?;
    let dest_path = dest.join(relative);

    if entry.is_dir() {
      fs::create_dir_all(&dest_path)?;
      continue;
    }

    let parent = dest_path.parent().unwrap_or(dest);
    fs::create_dir_all(parent)?;

    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    io::copy(&mut entry, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(&dest_path).map_err(|e| e.error)?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      if let Some(mode) = entry.unix_mode() {
        fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode))?;
      }
    }

    debug!(path = %dest_path.display(), "extracted");
    extracted.push(dest_path);
  }

  Ok(extracted)
}
