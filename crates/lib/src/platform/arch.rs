use std::fmt;

/// CPU architectures a runtime binary can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X64,
  X86,
  Armv6,
  Armv7,
  Arm64,
  Ppc64,
  S390x,
}

/// Every architecture identifier accepted in a target spec.
pub const KNOWN_ARCHS: &[Arch] = &[
  Arch::X64,
  Arch::X86,
  Arch::Armv6,
  Arch::Armv7,
  Arch::Arm64,
  Arch::Ppc64,
  Arch::S390x,
];

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    Self::from_alias(std::env::consts::ARCH)
  }

  /// Parse an architecture token, accepting common aliases
  /// (`x86_64`, `amd64`, `ia32`, `arm`, `aarch64`, ...).
  pub fn from_alias(token: &str) -> Option<Self> {
    let fancy = match token {
      "x86_64" | "amd64" => "x64",
      "ia32" => "x86",
      "arm" => "armv7",
      "aarch64" => "arm64",
      "powerpc64" => "ppc64",
      other => other,
    };

    KNOWN_ARCHS.iter().copied().find(|arch| arch.as_str() == fancy)
  }

  /// Returns the canonical identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X64 => "x64",
      Self::X86 => "x86",
      Self::Armv6 => "armv6",
      Self::Armv7 => "armv7",
      Self::Arm64 => "arm64",
      Self::Ppc64 => "ppc64",
      Self::S390x => "s390x",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
