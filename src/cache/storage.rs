//! Cache storage trait and on-disk snapshot implementation.

use serde_json::Value;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::traits::DiskRead;

/// Trait for snapshot storage backends.
///
/// Snapshots are raw upstream JSON written by an offline prefetch step.
/// Storage never writes; normalization happens after a read.
pub trait CacheStorage: Send + Sync {
  /// Resolve a snapshot file name to a path. Pure, no I/O.
  fn snapshot_path(&self, file_name: &str) -> Option<PathBuf>;

  /// Read and parse the snapshot for a file name.
  fn read(&self, file_name: &str) -> impl Future<Output = DiskRead<Value>> + Send {
    let path = self.snapshot_path(file_name);
    async move {
      match path {
        Some(path) => read_snapshot(&path).await,
        None => DiskRead::Absent,
      }
    }
  }
}

/// Storage implementation that never has a snapshot.
/// Used for network-only caches - every read is a miss.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn snapshot_path(&self, _file_name: &str) -> Option<PathBuf> {
    None
  }
}

/// Snapshot storage backed by a single build cache directory.
#[derive(Debug, Clone)]
pub struct DiskStorage {
  dir: PathBuf,
}

impl DiskStorage {
  /// Create a storage rooted at `dir`. The directory does not need to exist.
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }
}

impl CacheStorage for DiskStorage {
  fn snapshot_path(&self, file_name: &str) -> Option<PathBuf> {
    Some(self.dir.join(file_name))
  }
}

/// Read a JSON snapshot, classifying every failure as a kind of miss.
pub async fn read_snapshot(path: &Path) -> DiskRead<Value> {
  let raw = match tokio::fs::read_to_string(path).await {
    Ok(raw) => raw,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      debug!(path = %path.display(), "No snapshot on disk");
      return DiskRead::Absent;
    }
    Err(e) => {
      return DiskRead::Unreadable(format!("Failed to read {}: {}", path.display(), e));
    }
  };

  match serde_json::from_str(&raw) {
    Ok(value) => DiskRead::Hit(value),
    Err(e) => DiskRead::Malformed(format!("Failed to parse {}: {}", path.display(), e)),
  }
}
