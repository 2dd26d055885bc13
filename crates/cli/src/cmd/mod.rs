mod build;
mod compare;
mod targets;

pub use build::cmd_build;
pub use compare::cmd_compare;
pub use targets::cmd_targets;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use exeforge_lib::{FlagOverrides, SessionOptions};

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Session options from an optional config file, with command line flags
/// applied on top.
pub fn load_session_options(config: Option<&Path>, overrides: &FlagOverrides) -> Result<SessionOptions> {
  let mut options: SessionOptions = match config {
    Some(path) => read_json(path)?,
    None => SessionOptions::default(),
  };
  options.flags = options.flags.merge(overrides);
  Ok(options)
}
