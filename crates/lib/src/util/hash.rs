//! Hashing utilities for download verification.
//!
//! This module provides:
//! - `ContentHash`: a full 64-character lowercase hex SHA-256
//! - `hash_bytes()`: arbitrary byte hashing
//! - `write_hashed()`: drain a byte stream to disk while hashing it

use std::io;
use std::path::Path;

use futures_util::{Stream, StreamExt};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// A full 64-character SHA-256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub String);

impl ContentHash {
  /// Compare against an expected digest, ignoring ASCII case.
  pub fn matches(&self, expected: &str) -> bool {
    self.0.eq_ignore_ascii_case(expected.trim())
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

/// Write every chunk of `stream` to `dest` and feed it into a SHA-256
/// accumulator at the same time.
///
/// Returns once the stream is exhausted and the file has been flushed and
/// synced, together with the digest and the number of bytes written.
pub async fn write_hashed<S, B, E>(stream: S, dest: &Path) -> io::Result<(ContentHash, u64)>
where
  S: Stream<Item = Result<B, E>>,
  B: AsRef<[u8]>,
  E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
  let mut stream = std::pin::pin!(stream);
  let mut file = fs::File::create(dest).await?;
  let mut hasher = Sha256::new();
  let mut written = 0u64;

  while let Some(chunk) = stream.next().await {
    let chunk = chunk.map_err(io::Error::other)?;
    let bytes = chunk.as_ref();
    hasher.update(bytes);
    file.write_all(bytes).await?;
    written += bytes.len() as u64;
  }

  file.flush().await?;
  file.sync_all().await?;

  Ok((ContentHash(hex::encode(hasher.finalize())), written))
}
