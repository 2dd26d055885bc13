use crate::consts::{APP_NAME, CACHE_ENV, ROOT_ENV};
use std::path::PathBuf;

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE")
    .map(PathBuf::from)
    .unwrap_or_else(|_| std::env::temp_dir())
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| std::env::temp_dir())
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir())
    .join(APP_NAME)
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

/// Returns the directory for cache files for the application
#[cfg(windows)]
pub fn cache_dir() -> PathBuf {
  std::env::var("LOCALAPPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir())
    .join(APP_NAME)
    .join("Cache")
}

/// Returns the directory for cache files for the application
#[cfg(not(windows))]
pub fn cache_dir() -> PathBuf {
  let cache_home = std::env::var("XDG_CACHE_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".cache"));
  cache_home.join(APP_NAME)
}

/// Root directory for exeforge state. `EXEFORGE_ROOT` wins over the data dir.
pub fn root_dir() -> PathBuf {
  std::env::var(ROOT_ENV).map(PathBuf::from).unwrap_or_else(|_| data_dir())
}

/// Shared download/tool cache. `EXEFORGE_CACHE` wins over the cache dir.
pub fn shared_cache_dir() -> PathBuf {
  std::env::var(CACHE_ENV)
    .map(PathBuf::from)
    .unwrap_or_else(|_| cache_dir())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  #[cfg(not(windows))]
  fn xdg_fallback_to_home_directories() {
    temp_env::with_vars(
      [
        ("XDG_DATA_HOME", None::<&str>),
        ("XDG_CACHE_HOME", None::<&str>),
        ("HOME", Some("/home/user")),
      ],
      || {
        assert_eq!(data_dir(), PathBuf::from("/home/user/.local/share").join(APP_NAME));
        assert_eq!(cache_dir(), PathBuf::from("/home/user/.cache").join(APP_NAME));
      },
    );
  }

  #[test]
  #[serial]
  #[cfg(not(windows))]
  fn xdg_cache_home_takes_precedence() {
    temp_env::with_vars(
      [("XDG_CACHE_HOME", Some("/custom/cache")), ("HOME", Some("/home/user"))],
      || {
        assert_eq!(cache_dir(), PathBuf::from("/custom/cache").join(APP_NAME));
      },
    );
  }

  #[test]
  #[serial]
  fn env_var_overrides_default_paths() {
    temp_env::with_vars(
      [(ROOT_ENV, Some("/custom/root")), (CACHE_ENV, Some("/custom/cache"))],
      || {
        assert_eq!(root_dir(), PathBuf::from("/custom/root"));
        assert_eq!(shared_cache_dir(), PathBuf::from("/custom/cache"));
      },
    );
  }
}
