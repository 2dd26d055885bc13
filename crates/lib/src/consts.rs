//! Shared constants.

/// Application name, used for per-user data and cache directories.
pub const APP_NAME: &str = "exeforge";

/// Prefix of the per-session scratch root inside the system temp directory.
pub const TMP_PREFIX: &str = "exeforge";

/// Platform whose runtime binaries carry patchable PE resources.
pub const PATCHABLE_PLATFORM: &str = "win";

/// Literal that replaces the first dash segment of a fetched runtime binary
/// name so the packaging tool picks the working copy up as a local build.
pub const BUILT_PREFIX: &str = "built";

/// Subdirectory of a task's scratch dir holding the patched runtime binaries.
pub const NODE_BIN_DIR: &str = "node";

/// Name of the resource-script template inside the resource directory.
pub const RC_TEMPLATE_FILENAME: &str = "version_info.rc";

/// Environment variable the packaging tool reads its binary cache from.
pub const PKG_CACHE_ENV: &str = "PKG_CACHE_PATH";

/// Environment variable telling the packaging tool to ignore binary tags.
pub const PKG_IGNORE_TAG_ENV: &str = "PKG_IGNORE_TAG";

/// Overrides the root directory.
pub const ROOT_ENV: &str = "EXEFORGE_ROOT";

/// Overrides the cache directory.
pub const CACHE_ENV: &str = "EXEFORGE_CACHE";

/// Pins the SHA-256 of the default ResourceHacker archive.
pub const RH_SHA256_ENV: &str = "EXEFORGE_RH_SHA256";
