//! Implementation of the `exeforge build` command.
//!
//! Reads a task file, runs it on a fresh session and removes the session's
//! scratch root afterwards.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::warn;

use exeforge_lib::{Session, SessionOptions, TaskOptions};

use crate::cmd::read_json;
use crate::output::{print_json, print_stat, print_success, print_warning, symbols};

pub fn cmd_build(task_file: &Path, session_options: SessionOptions, json: bool) -> Result<()> {
  let task_options: TaskOptions = read_json(task_file)?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(async {
    let started = Instant::now();
    let session = Session::init(session_options).await.context("Failed to initialize session")?;

    let result = session.exec(task_options).await;

    if let Err(e) = session.cleanup().await {
      warn!(error = %e, "session cleanup failed");
      print_warning(&format!("Scratch root left behind: {}", e));
    }

    let task = result.context("Build failed")?;
    let elapsed = humantime::format_duration(started.elapsed());

    if json {
      let targets: Vec<_> = task
        .targets()
        .iter()
        .map(|t| {
          serde_json::json!({
            "name": t.name(),
            "spec": t.base.original,
            "version": t.version,
            "patched": t.tmp_path,
          })
        })
        .collect();
      print_json(&serde_json::json!({
        "task": task.name(),
        "state": task.state(),
        "handler": task.handler_kind(),
        "targets": targets,
      }))?;
    } else {
      print_success(&format!("{} finished in {}", task.name(), elapsed));
      print_stat("Handler", task.handler_kind());
      print_stat("Targets", &task.specs().join(", "));
      for target in task.targets() {
        match &target.version {
          Some(version) => println!("  {} {} ({})", symbols::ARROW, target.name(), version),
          None => println!("  {} {}", symbols::ARROW, target.name()),
        }
      }
    }

    Ok::<(), anyhow::Error>(())
  })
}
