//! Core traits and types for the caching system.

use serde_json::Value;

/// Trait for canonical values that can be memoized by the cache layer.
///
/// Implementors validate a raw upstream payload and apply their defaulting
/// rules. The same conversion runs for disk snapshots and network bodies.
pub trait Cacheable: Clone + Send + Sync + 'static {
  /// Validate and normalize a raw upstream payload.
  fn from_payload(payload: Value) -> serde_json::Result<Self>;

  /// Content type name for logging (e.g., "posts", "about")
  fn content_type() -> &'static str;
}

impl<T> Cacheable for Vec<T>
where
  T: Cacheable,
{
  fn from_payload(payload: Value) -> serde_json::Result<Self> {
    match payload {
      Value::Array(items) => items.into_iter().map(T::from_payload).collect(),
      other => Err(serde::de::Error::custom(format!(
        "expected an array of {}, found {}",
        T::content_type(),
        json_kind(&other)
      ))),
    }
  }

  fn content_type() -> &'static str {
    T::content_type()
  }
}

/// Key identifying one memoized value.
pub trait CacheKey {
  /// Stable identity used for memoization
  fn cache_id(&self) -> String;

  /// Snapshot file name inside the cache directory
  fn file_name(&self) -> String;

  /// Human-readable description for logs and errors
  fn description(&self) -> String;
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// Independently owned copy of the memoized value
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  pub fn new(data: T, source: CacheSource) -> Self {
    Self { data, source }
  }
}

/// Indicates where a cached value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Already memoized (or in flight) when the call was made
  Memory,
  /// Loaded from an on-disk snapshot by this call
  Disk,
  /// Fetched from the remote API by this call
  Network,
}

/// What happened when a disk snapshot was read.
///
/// Only `Hit` short-circuits the network. The other outcomes are all cache
/// misses but are kept apart so a broken snapshot is visible in the logs.
#[derive(Debug)]
pub enum DiskRead<T> {
  Hit(T),
  /// No file at the resolved path
  Absent,
  /// File exists but could not be read
  Unreadable(String),
  /// File was read but is not valid JSON or fails validation
  Malformed(String),
}

impl<T> DiskRead<T> {
  /// Apply a fallible conversion to a hit, turning failures into `Malformed`.
  pub fn and_then<U, E: std::fmt::Display>(self, f: impl FnOnce(T) -> Result<U, E>) -> DiskRead<U> {
    match self {
      DiskRead::Hit(value) => match f(value) {
        Ok(converted) => DiskRead::Hit(converted),
        Err(e) => DiskRead::Malformed(e.to_string()),
      },
      DiskRead::Absent => DiskRead::Absent,
      DiskRead::Unreadable(e) => DiskRead::Unreadable(e),
      DiskRead::Malformed(e) => DiskRead::Malformed(e),
    }
  }
}

/// Whether a failed load stays memoized for the life of the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
  /// A failed load is the permanent outcome for its key
  #[default]
  Memoize,
  /// A failed load is evicted so the next call starts over
  Retry,
}
