//! Tracing subscriber setup.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use exeforge_lib::Flags;
use exeforge_lib::platform::paths::shared_cache_dir;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `--verbose`. `silent` installs nothing.
pub fn init(flags: &Flags, verbose: bool, log_file: Option<PathBuf>) -> Result<()> {
  if flags.silent {
    return Ok(());
  }

  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let (writer, ansi) = if flags.log_to_file {
    let path = log_file.unwrap_or_else(|| shared_cache_dir().join("exeforge.log"));
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(&path).with_context(|| format!("Failed to open log file {}", path.display()))?;
    (BoxMakeWriter::new(Mutex::new(file)), false)
  } else {
    (BoxMakeWriter::new(std::io::stderr), true)
  };

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(ansi)
    .without_time();

  if flags.pretty_print {
    builder.pretty().init();
  } else {
    builder.compact().init();
  }

  Ok(())
}
