//! Verification of a built executable against a reference directory.
//!
//! A reference directory holds the expected `stdout` and `stderr` of a run
//! plus the expected resources: `icon.ico`, `dialog.rc` and `manifest`.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::handler::HandlerError;
use crate::process::run_tool;
use crate::session::CompareReport;
use crate::util::compare_artifacts;

/// (name, file written by resource extraction, file in the reference dir)
pub const ARTIFACTS: [(&str, &str, &str); 3] = [
  ("icon", "ICON1_1.ico", "icon.ico"),
  ("rc", "dialog.rc", "dialog.rc"),
  ("manifest", "MANIFEST1_1.txt", "manifest"),
];

impl CompareReport {
  pub fn new(run: bool, icon: bool, rc: bool, manifest: bool) -> Self {
    Self {
      run,
      icon,
      rc,
      manifest,
      all: run && icon && rc && manifest,
    }
  }
}

/// Run `exe` without arguments and compare its output byte for byte with
/// `reference_dir/stdout` and `reference_dir/stderr`.
pub async fn run_matches(exe: &Path, reference_dir: &Path) -> Result<bool, HandlerError> {
  let output = run_tool(exe, std::iter::empty::<&str>(), &BTreeMap::new()).await?;

  let stdout = tokio::fs::read(reference_dir.join("stdout")).await?;
  let stderr = tokio::fs::read(reference_dir.join("stderr")).await?;

  let matches = output.stdout == stdout && output.stderr == stderr;
  debug!(exe = %exe.display(), matches, "run compared");
  Ok(matches)
}

/// Compare the extracted resources in `extracted` with `reference_dir`.
pub async fn compare_resources(run: bool, extracted: &Path, reference_dir: &Path) -> io::Result<CompareReport> {
  let mut results = [false; 3];

  for (slot, (name, value, base)) in results.iter_mut().zip(ARTIFACTS) {
    *slot = compare_artifacts(&extracted.join(value), &reference_dir.join(base)).await?;
    debug!(artifact = name, equal = *slot, "artifact compared");
  }

  let [icon, rc, manifest] = results;
  Ok(CompareReport::new(run, icon, rc, manifest))
}
