mod cmd;
mod logging;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use exeforge_lib::FlagOverrides;

use crate::output::print_error;

/// exeforge - build per-target executables with patched resources
#[derive(Parser)]
#[command(name = "exeforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Print results as JSON
  #[arg(long, global = true)]
  json: bool,

  #[command(flatten)]
  flags: FlagArgs,

  /// Log file used with --log-to-file (default: <cache>/exeforge.log)
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

/// Session flag overrides.
#[derive(Args, Debug, Clone, Copy)]
struct FlagArgs {
  /// Keep temporary files and directories
  #[arg(long, global = true)]
  keep_tmp: bool,

  /// Write logs to a file instead of stderr
  #[arg(long, global = true)]
  log_to_file: bool,

  /// Compact single-line log output
  #[arg(long, global = true)]
  no_pretty: bool,

  /// No log output at all
  #[arg(short, long, global = true)]
  silent: bool,

  /// Don't verify the digest of downloaded tool archives
  #[arg(long, global = true)]
  skip_hash_checks: bool,

  /// Edit resources with ResourceHacker instead of rcedit
  #[arg(long, global = true)]
  use_rh: bool,
}

impl FlagArgs {
  /// Only flags given on the command line override configured ones.
  fn overrides(self) -> FlagOverrides {
    let set = |on: bool| on.then_some(true);
    FlagOverrides {
      keep_tmp: set(self.keep_tmp),
      log_to_file: set(self.log_to_file),
      pretty_print: self.no_pretty.then_some(false),
      silent: set(self.silent),
      skip_hash_checks: set(self.skip_hash_checks),
      use_rh: set(self.use_rh),
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Run a build task described by a JSON file
  Build {
    /// Task file (targets, metadata, args, pkg, flags)
    task: PathBuf,

    /// Session configuration file (paths, tools, flags)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },

  /// Compare a built executable with a reference directory
  Compare {
    /// Executable to check
    exe: PathBuf,

    /// Directory holding stdout, stderr, icon.ico, dialog.rc and manifest
    reference: PathBuf,

    /// Don't run the executable
    #[arg(long)]
    no_run: bool,

    /// Session configuration file (paths, tools, flags)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },

  /// Resolve target specs without building
  Targets {
    /// Target specs, e.g. node14-win-x64 or host
    #[arg(required = true)]
    specs: Vec<String>,

    /// Runtime range `host` resolves to (detected from node if unset)
    #[arg(long)]
    host_runtime: Option<String>,
  },
}

fn main() {
  let cli = Cli::parse();

  if let Err(e) = run(cli) {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let overrides = cli.flags.overrides();

  match cli.command {
    Commands::Build { task, config } => {
      let session_options = cmd::load_session_options(config.as_deref(), &overrides)?;
      logging::init(&session_options.flags, cli.verbose, cli.log_file)?;
      cmd::cmd_build(&task, session_options, cli.json)
    }
    Commands::Compare {
      exe,
      reference,
      no_run,
      config,
    } => {
      let session_options = cmd::load_session_options(config.as_deref(), &overrides)?;
      logging::init(&session_options.flags, cli.verbose, cli.log_file)?;
      cmd::cmd_compare(&exe, &reference, !no_run, session_options, cli.json)
    }
    Commands::Targets { specs, host_runtime } => {
      let flags = exeforge_lib::Flags::default().merge(&overrides);
      logging::init(&flags, cli.verbose, cli.log_file)?;
      cmd::cmd_targets(&specs, host_runtime, cli.json)
    }
  }
}
