use std::fmt;

/// Platforms a runtime binary can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Alpine,
  FreeBsd,
  Linux,
  LinuxStatic,
  MacOs,
  Win,
}

/// Every platform identifier accepted in a target spec.
pub const KNOWN_PLATFORMS: &[Os] = &[Os::Alpine, Os::FreeBsd, Os::Linux, Os::LinuxStatic, Os::MacOs, Os::Win];

impl Os {
  /// Detect the current operating system at runtime
  ///
  /// Linux hosts running musl (Alpine) report `Alpine`.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" if std::path::Path::new("/etc/alpine-release").exists() => Some(Self::Alpine),
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Win),
      "freebsd" => Some(Self::FreeBsd),
      _ => None,
    }
  }

  /// Parse a platform token, accepting common aliases
  /// (`darwin`, `osx`, `win32`, `windows`, ...).
  pub fn from_alias(token: &str) -> Option<Self> {
    let fancy = match token {
      "darwin" | "mac" | "osx" => "macos",
      "lin" => "linux",
      "win32" | "windows" => "win",
      other => other,
    };

    KNOWN_PLATFORMS.iter().copied().find(|os| os.as_str() == fancy)
  }

  /// Returns the canonical identifier for this platform
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Alpine => "alpine",
      Self::FreeBsd => "freebsd",
      Self::Linux => "linux",
      Self::LinuxStatic => "linuxstatic",
      Self::MacOs => "macos",
      Self::Win => "win",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
