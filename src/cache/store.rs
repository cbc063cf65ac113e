//! Cache store abstraction and in-memory implementation

use crate::error::{EngineError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

/// Opaque key-value cache collaborator.
///
/// Implementations may be remote and may fail; the recommendation cache
/// fails open on any error here.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()>;
    /// Invalidate all keys matching a glob pattern
    async fn invalidate(&self, pattern: &str) -> Result<()>;
}

#[derive(Clone)]
struct StoredValue {
    payload: Bytes,
    ttl: Duration,
}

/// Expire each entry after its own TTL rather than a cache-wide one.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache store backed by moka, with per-entry TTL and glob
/// pattern invalidation. The default store and the test substitute.
pub struct MemoryCacheStore {
    cache: Cache<String, StoredValue>,
}

impl MemoryCacheStore {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .support_invalidation_closures()
            .build();
        Self { cache }
    }

    /// Number of live entries (approximate, as moka counts lazily)
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.cache.get(key).await.map(|v| v.payload))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        self.cache
            .insert(key.to_string(), StoredValue { payload: value, ttl })
            .await;
        Ok(())
    }

    async fn invalidate(&self, pattern: &str) -> Result<()> {
        let matcher = glob::Pattern::new(pattern)
            .map_err(|e| EngineError::CacheStore(format!("bad pattern '{}': {}", pattern, e)))?;
        self.cache
            .invalidate_entries_if(move |key, _| matcher.matches(key))
            .map_err(|e| EngineError::CacheStore(e.to_string()))?;
        Ok(())
    }
}
