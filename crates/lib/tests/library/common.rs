//! Shared helpers: fake collaborators and isolated session options.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use exeforge_lib::SessionOptions;
use exeforge_lib::fetch::{FetchError, RuntimeFetcher};
use exeforge_lib::handler::{HandlerError, RceditOptions, ResourceLibrary};
use exeforge_lib::target::BaseTarget;

/// Fetcher that materializes `fetched-v14.20.0-<platform>-<arch>`.
#[derive(Default)]
pub struct FakeFetcher {
  pub fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl RuntimeFetcher for FakeFetcher {
  async fn probe(&self, _target: &BaseTarget) -> Result<(), FetchError> {
    Ok(())
  }

  async fn fetch(&self, target: &BaseTarget, output: &Path) -> Result<PathBuf, FetchError> {
    self.fetched.lock().unwrap().push(target.name.clone());
    tokio::fs::create_dir_all(output).await?;
    let path = output.join(format!("fetched-v14.20.0-{}-{}", target.platform, target.arch));
    tokio::fs::write(&path, b"MZ runtime").await?;
    Ok(path)
  }
}

/// Library that appends the product name to the executable it edits.
#[derive(Default)]
pub struct StampingLibrary;

#[async_trait]
impl ResourceLibrary for StampingLibrary {
  async fn edit(&self, exe: &Path, options: &RceditOptions) -> Result<(), HandlerError> {
    let mut bytes = tokio::fs::read(exe).await?;
    if let Some(name) = options.version_string.get("ProductName") {
      bytes.extend_from_slice(name.as_bytes());
    }
    tokio::fs::write(exe, bytes).await?;
    Ok(())
  }
}

pub struct TestEnv {
  pub temp: TempDir,
  pub fetcher: Arc<FakeFetcher>,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
      fetcher: Arc::new(FakeFetcher::default()),
    }
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Options with every root inside the temp dir and fake collaborators.
  pub fn session_options(&self) -> SessionOptions {
    SessionOptions {
      root: Some(self.path().join("root")),
      cache: Some(self.path().join("cache")),
      tmp_parent: Some(self.path().join("tmp")),
      host_runtime: Some("node18".to_string()),
      fetcher: Some(self.fetcher.clone()),
      library: Some(Arc::new(StampingLibrary)),
      ..Default::default()
    }
  }

  #[cfg(unix)]
  pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = self.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }
}
