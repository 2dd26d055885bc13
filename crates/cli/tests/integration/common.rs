//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the root, cache and
/// scratch parent of the session, plus the task and session config files.
pub struct TestEnv {
  pub temp: TempDir,
  pub task_path: PathBuf,
  pub config_path: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let task_path = temp.path().join("task.json");
    let config_path = temp.path().join("session.json");
    let env = Self {
      temp,
      task_path,
      config_path,
    };
    env.write_config(serde_json::json!({}));
    env
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Write the task file.
  pub fn write_task(&self, task: serde_json::Value) {
    std::fs::write(&self.task_path, task.to_string()).unwrap();
  }

  /// Write the session file. Roots always point into the temp dir.
  pub fn write_config(&self, extra: serde_json::Value) {
    let mut config = serde_json::json!({
      "root": self.path().join("root"),
      "cache": self.path().join("cache"),
      "tmpParent": self.path().join("tmp"),
      "hostRuntime": "node18",
    });
    if let (Some(config), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
      for (key, value) in extra {
        config.insert(key.clone(), value.clone());
      }
    }
    std::fs::write(&self.config_path, config.to_string()).unwrap();
  }

  /// Write a fake tool script.
  #[cfg(unix)]
  pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = self.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  /// Scratch parent; empty once every session cleaned up.
  pub fn scratch_entries(&self) -> usize {
    match std::fs::read_dir(self.path().join("tmp")) {
      Ok(entries) => entries.count(),
      Err(_) => 0,
    }
  }

  /// exeforge command reading this environment's session config.
  pub fn exeforge_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("exeforge");
    cmd.arg("--silent").current_dir(self.path());
    cmd
  }
}
