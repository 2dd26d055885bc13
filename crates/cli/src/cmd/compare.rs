//! Implementation of the `exeforge compare` command.

use std::path::Path;

use anyhow::{Context, Result, bail};

use exeforge_lib::{Session, SessionOptions};

use crate::output::{print_check, print_json, print_success};

pub fn cmd_compare(exe: &Path, reference: &Path, run: bool, session_options: SessionOptions, json: bool) -> Result<()> {
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(async {
    let session = Session::init(session_options).await.context("Failed to initialize session")?;
    let report = session.compare(exe, reference, run).await;
    session.cleanup().await.context("Failed to clean up session")?;
    report.context("Compare failed")
  })?;

  if json {
    print_json(&report)?;
  } else {
    println!("{}", exe.display());
    print_check("run", report.run);
    print_check("icon", report.icon);
    print_check("rc", report.rc);
    print_check("manifest", report.manifest);
  }

  if !report.all {
    bail!("{} does not match {}", exe.display(), reference.display());
  }

  if !json {
    print_success("All checks passed");
  }
  Ok(())
}
