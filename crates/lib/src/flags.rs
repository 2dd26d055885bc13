//! Behaviour flags for sessions and tasks.
//!
//! A session carries a full set of `Flags`. Each task may carry
//! `FlagOverrides`; a set override always wins over the session default for
//! that one field.

use serde::{Deserialize, Serialize};

/// All the flags a session or task runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Flags {
  /// Don't delete temporary files and directories.
  pub keep_tmp: bool,
  /// Log to a file instead of the console.
  pub log_to_file: bool,
  /// Pretty print the log output.
  pub pretty_print: bool,
  /// Don't produce any log output.
  pub silent: bool,
  /// Skip the digest check of downloaded tool archives.
  pub skip_hash_checks: bool,
  /// Edit resources with ResourceHacker instead of rcedit.
  pub use_rh: bool,
}

impl Default for Flags {
  fn default() -> Self {
    Self {
      keep_tmp: false,
      log_to_file: false,
      pretty_print: true,
      silent: false,
      skip_hash_checks: false,
      use_rh: false,
    }
  }
}

/// Partial flags. `None` keeps the value of the flags being merged into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlagOverrides {
  pub keep_tmp: Option<bool>,
  pub log_to_file: Option<bool>,
  pub pretty_print: Option<bool>,
  pub silent: Option<bool>,
  pub skip_hash_checks: Option<bool>,
  pub use_rh: Option<bool>,
}

impl Flags {
  /// Apply overrides field by field.
  pub fn merge(&self, overrides: &FlagOverrides) -> Flags {
    Flags {
      keep_tmp: overrides.keep_tmp.unwrap_or(self.keep_tmp),
      log_to_file: overrides.log_to_file.unwrap_or(self.log_to_file),
      pretty_print: overrides.pretty_print.unwrap_or(self.pretty_print),
      silent: overrides.silent.unwrap_or(self.silent),
      skip_hash_checks: overrides.skip_hash_checks.unwrap_or(self.skip_hash_checks),
      use_rh: overrides.use_rh.unwrap_or(self.use_rh),
    }
  }
}
