//! Target specification parsing.
//!
//! A target spec is either the literal `host` or a dash separated list of
//! tokens in any order, e.g. `node14-win-x64` or `win-node14`. Tokens that
//! are omitted fall back to the host's values.

mod types;

pub use types::{BaseTarget, HostInfo, Target, TargetError, working_name};

use tracing::debug;

use crate::platform::arch::Arch;
use crate::platform::os::Os;

/// Spec that resolves to the host without looking at tokens.
pub const HOST_SPEC: &str = "host";

/// Role a single spec token plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  RuntimeRange(String),
  Platform(Os),
  Arch(Arch),
}

/// Classify a token. Predicates are tried in a fixed order: runtime range,
/// platform, architecture. The first one that matches wins.
pub fn classify(token: &str) -> Option<Token> {
  if is_valid_runtime_range(token) {
    return Some(Token::RuntimeRange(token.to_string()));
  }
  if let Some(os) = Os::from_alias(token) {
    return Some(Token::Platform(os));
  }
  Arch::from_alias(token).map(Token::Arch)
}

/// `latest`, or `node` followed by a semver range (`node14`, `node16.10`).
pub fn is_valid_runtime_range(token: &str) -> bool {
  if token == "latest" {
    return true;
  }
  let Some(range) = token.strip_prefix("node") else {
    return false;
  };
  range.is_empty() || semver::VersionReq::parse(range).is_ok()
}

/// Parse a single target spec.
pub fn parse_target(spec: &str, host: &HostInfo) -> Result<BaseTarget, TargetError> {
  let mut runtime_range = host.runtime_range.clone();
  let mut platform = host.platform.clone();
  let mut arch = host.arch.clone();

  if spec != HOST_SPEC {
    for token in spec.split('-').filter(|t| !t.is_empty()) {
      match classify(token) {
        Some(Token::RuntimeRange(range)) => runtime_range = range,
        Some(Token::Platform(os)) => platform = os.as_str().to_string(),
        Some(Token::Arch(a)) => arch = a.as_str().to_string(),
        None => return Err(TargetError::InvalidTarget(spec.to_string())),
      }
    }
  }

  let target = BaseTarget::new(runtime_range, platform, arch, spec);
  debug!(spec = %spec, target = %target.name, "resolved target");
  Ok(target)
}

/// Parse every spec. Fails on the first invalid one.
pub fn resolve_targets<S: AsRef<str>>(specs: &[S], host: &HostInfo) -> Result<Vec<BaseTarget>, TargetError> {
  specs.iter().map(|spec| parse_target(spec.as_ref(), host)).collect()
}
