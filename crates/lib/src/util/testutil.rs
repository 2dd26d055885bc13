//! Test utilities for exeforge-lib.
//!
//! Cross-platform helpers for tests that need to execute shell commands,
//! stand in for external tools, or build small zip archives.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Write an executable `/bin/sh` script standing in for an external tool.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Write a zip archive holding `entries` (name, content).
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
  let file = std::fs::File::create(path).unwrap();
  let mut writer = zip::ZipWriter::new(file);
  let options = zip::write::SimpleFileOptions::default();

  for (name, content) in entries {
    writer.start_file(*name, options).unwrap();
    writer.write_all(content).unwrap();
  }

  writer.finish().unwrap();
}

/// Bytes of a zip archive holding `entries`.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
  let temp = tempfile::tempdir().unwrap();
  let path = temp.path().join("archive.zip");
  write_zip(&path, entries);
  std::fs::read(path).unwrap()
}
