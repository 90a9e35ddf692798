//! Cache layer that orchestrates disk snapshots, network fetching and memoization.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::storage::CacheStorage;
use super::traits::{CacheKey, CacheResult, CacheSource, Cacheable, DiskRead, FailurePolicy};
use crate::error::ContentError;

type LoadOutcome<T> = Result<(Arc<T>, CacheSource), ContentError>;
type SharedLoad<T> = Shared<BoxFuture<'static, LoadOutcome<T>>>;

/// Single-flight, disk-first memo for one content type.
///
/// The first call for a key installs a shared load; every later call, whether
/// the load is still running or long finished, awaits that same load. A load
/// reads the disk snapshot once and only touches the network when the
/// snapshot is missing or unusable. Nothing is ever refreshed.
pub struct CacheLayer<T, S> {
  storage: Arc<S>,
  entries: Arc<Mutex<HashMap<String, SharedLoad<T>>>>,
  failure_policy: FailurePolicy,
}

impl<T, S> CacheLayer<T, S>
where
  T: Cacheable,
  S: CacheStorage + 'static,
{
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self::with_shared_storage(Arc::new(storage))
  }

  /// Create a cache layer over storage shared with other layers.
  pub fn with_shared_storage(storage: Arc<S>) -> Self {
    Self {
      storage,
      entries: Arc::new(Mutex::new(HashMap::new())),
      failure_policy: FailurePolicy::default(),
    }
  }

  /// Set what happens to a key whose load failed.
  pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
    self.failure_policy = failure_policy;
    self
  }

  /// Number of keys with a memoized or in-flight load.
  pub fn len(&self) -> usize {
    self.lock_entries("len").len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Fetch a value with disk-first, single-flight memoization.
  ///
  /// 1. Memo hit (resolved or in flight) - await the shared load
  /// 2. Otherwise install a new load: disk snapshot, then `fetcher`
  /// 3. Return an owned copy of the memoized value
  ///
  /// `fetcher` is only invoked by the call that installs the load, and the
  /// future it returns is only polled when the snapshot misses.
  pub async fn fetch<K, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<T>, ContentError>
  where
    K: CacheKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ContentError>> + Send + 'static,
  {
    let id = key.cache_id();

    let (load, joined) = {
      let mut entries = self.lock_entries("fetch");
      match entries.get(&id) {
        Some(existing) => {
          debug!(key = %id, "Memo hit");
          (existing.clone(), true)
        }
        None => {
          let load = Self::load(
            Arc::clone(&self.storage),
            key.description(),
            key.file_name(),
            fetcher(),
          )
          .boxed()
          .shared();
          entries.insert(id.clone(), load.clone());
          (load, false)
        }
      }
    };

    match load.clone().await {
      Ok((value, source)) => {
        let source = if joined { CacheSource::Memory } else { source };
        Ok(CacheResult::new((*value).clone(), source))
      }
      Err(e) => {
        if self.failure_policy == FailurePolicy::Retry {
          self.evict(&id, &load);
        }
        Err(e)
      }
    }
  }

  async fn load<Fut>(
    storage: Arc<S>,
    description: String,
    file_name: String,
    fetch: Fut,
  ) -> LoadOutcome<T>
  where
    Fut: Future<Output = Result<Value, ContentError>> + Send,
  {
    match storage.read(&file_name).await.and_then(T::from_payload) {
      DiskRead::Hit(value) => {
        info!(content = %description, file = %file_name, "Loaded snapshot from disk");
        return Ok((Arc::new(value), CacheSource::Disk));
      }
      DiskRead::Absent => {}
      DiskRead::Unreadable(reason) | DiskRead::Malformed(reason) => {
        warn!(content = %description, %reason, "Ignoring unusable snapshot");
      }
    }

    info!(content = %description, "Fetching from remote API");
    let payload = fetch.await?;
    let value = T::from_payload(payload).map_err(|e| ContentError::InvalidPayload {
      content: description.clone(),
      message: e.to_string(),
    })?;

    Ok((Arc::new(value), CacheSource::Network))
  }

  /// Drop a failed load, unless another call already replaced it.
  fn evict(&self, id: &str, failed: &SharedLoad<T>) {
    let mut entries = self.lock_entries("evict");
    if entries.get(id).is_some_and(|current| current.ptr_eq(failed)) {
      debug!(key = %id, "Evicting failed load");
      entries.remove(id);
    }
  }

  fn lock_entries(&self, op: &'static str) -> MutexGuard<'_, HashMap<String, SharedLoad<T>>> {
    match self.entries.lock() {
      Ok(guard) => guard,
      Err(poisoned) => {
        warn!(op, "Recovered from poisoned cache lock");
        poisoned.into_inner()
      }
    }
  }
}

impl<T, S> Clone for CacheLayer<T, S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      entries: Arc::clone(&self.entries),
      failure_policy: self.failure_policy,
    }
  }
}
