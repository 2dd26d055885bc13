//! Implementation of the `exeforge targets` command.

use anyhow::{Context, Result};

use exeforge_lib::platform::Platform;
use exeforge_lib::session::detect_host_runtime;
use exeforge_lib::target::{HostInfo, resolve_targets};

use crate::output::{print_info, print_json, symbols};

pub fn cmd_targets(specs: &[String], host_runtime: Option<String>, json: bool) -> Result<()> {
  let host_runtime = match host_runtime {
    Some(range) => range,
    None => {
      let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
      rt.block_on(detect_host_runtime())
    }
  };

  let host = HostInfo::detect(host_runtime);
  let targets = resolve_targets(specs, &host)?;

  if json {
    return print_json(&targets);
  }

  match Platform::current() {
    Some(platform) => print_info(&format!("Host: {} ({})", platform, host.runtime_range)),
    None => print_info(&format!("Host: {}-{} ({})", host.platform, host.arch, host.runtime_range)),
  }
  for target in &targets {
    let patch = if target.is_patchable() { " [patched]" } else { "" };
    println!("  {} {} {}{}", target.original, symbols::ARROW, target.name, patch);
  }

  Ok(())
}
