//! Fetching of external assets.
//!
//! - `download`: verified streaming download of tool archives
//! - `runtime`: the runtime-binary fetch service and its `pkg-fetch` adapter

pub mod download;
pub mod runtime;

pub use download::{DownloadError, RH_ARCHIVE_URL, ToolSource, download_verified};
pub use runtime::{FetchError, PkgFetchCli, RuntimeFetcher};
