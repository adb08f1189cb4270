//! Content digests for image tagging and build-context comparison.
//!
//! - `ContentHash`: a full 64-character SHA-256 digest
//! - `hash_file()`: digest of one file, used for Dockerfile tags
//! - `hash_directory()`: deterministic digest of a whole tree (tests only)
//! - `hash_bytes()`: digest of arbitrary bytes (tests only)

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A full 64-character lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  /// The first `len` hex characters (the whole digest if shorter).
  pub fn prefix(&self, len: usize) -> &str {
    &self.0[..len.min(self.0.len())]
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("failed to walk directory: {message}")]
  WalkDir { message: String },

  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },
}

/// Hash a file's contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let read_err = |e: std::io::Error| DirHashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_err)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

#[cfg(test)]
pub(crate) fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(hex::encode(Sha256::digest(data)))
}

/// Compute a deterministic digest of a directory tree.
///
/// Covers relative paths, directory structure, and file contents. Timestamps and
/// permissions are ignored, so two extractions of the same context compare equal.
#[cfg(test)]
pub(crate) fn hash_directory(path: &Path) -> Result<ContentHash, DirHashError> {
  let mut entries: Vec<String> = Vec::new();

  for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
    let entry = entry.map_err(|e| DirHashError::WalkDir { message: e.to_string() })?;
    let rel_path = entry
      .path()
      .strip_prefix(path)
      .unwrap_or(entry.path())
      .to_string_lossy()
      .replace('\\', "/");

    if rel_path.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    if file_type.is_file() {
      entries.push(format!("F:{}:{}", rel_path, hash_file(entry.path())?));
    } else if file_type.is_dir() {
      entries.push(format!("D:{}", rel_path));
    }
  }

  entries.sort();

  let mut hasher = Sha256::new();
  for entry in entries {
    hasher.update(entry.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}
