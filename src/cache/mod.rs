//! Generic caching layer for upstream content.
//!
//! This module provides a content-agnostic caching mechanism that:
//! - Memoizes one normalized value per key for the life of the cache
//! - Prefers a pre-populated on-disk snapshot over a network call
//! - Shares a single in-flight load between concurrent callers
//! - Hands out owned copies so callers never observe each other's edits

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{read_snapshot, CacheStorage, DiskStorage, NoopStorage};
pub use traits::{CacheKey, CacheResult, CacheSource, Cacheable, DiskRead, FailurePolicy};
