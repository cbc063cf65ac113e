//! Recommendation result cache with singleflight semantics

use crate::cache::store::CacheStore;
use crate::config::CacheConfig;
use crate::engine::models::Recommendation;
use crate::error::Result;
use crate::metrics::METRICS;
use bytes::Bytes;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// How a cached lookup was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served from the store
    Hit,
    /// Computed here and written back
    Computed,
    /// Store unavailable, computed without caching
    Bypassed,
}

/// Memoizes final ranked lists per context fingerprint.
///
/// Guarantees at most one concurrent computation per fingerprint: concurrent
/// callers with the same fingerprint serialize on a per-fingerprint lock and
/// the losers read the winner's stored result. A store failure means the
/// cache fails open and the computation runs uncached.
pub struct RecommendationCache {
    store: Arc<dyn CacheStore>,
    flights: DashMap<String, Arc<Mutex<()>>>,
    config: CacheConfig,
}

impl RecommendationCache {
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self {
            store,
            flights: DashMap::new(),
            config,
        }
    }

    fn key(&self, fingerprint: &str) -> String {
        format!("{}:{}", self.config.key_prefix, fingerprint)
    }

    /// Return the cached ranking for `fingerprint`, computing it at most
    /// once across concurrent callers.
    pub async fn get_or_compute<F, Fut>(
        &self,
        fingerprint: &str,
        compute: F,
    ) -> Result<(Vec<Recommendation>, CacheOutcome)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Recommendation>>>,
    {
        let key = self.key(fingerprint);

        match self.store.get(&key).await {
            Ok(Some(payload)) => {
                if let Some(recommendations) = decode(&payload) {
                    debug!(fingerprint, "cache hit");
                    METRICS.cache_events.with_label_values(&["hit"]).inc();
                    return Ok((recommendations, CacheOutcome::Hit));
                }
                warn!(fingerprint, "cache payload undecodable, recomputing");
            }
            Ok(None) => {}
            Err(e) => {
                // Fail open: a broken store must not take recommendations down.
                warn!(fingerprint, error = %e, "cache store unavailable, bypassing");
                METRICS.cache_events.with_label_values(&["bypass"]).inc();
                let recommendations = compute().await?;
                return Ok((recommendations, CacheOutcome::Bypassed));
            }
        }

        let flight = self
            .flights
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = flight.lock().await;

        // Double-check under the lock: a concurrent winner may have
        // populated the store while this caller waited.
        if let Ok(Some(payload)) = self.store.get(&key).await {
            if let Some(recommendations) = decode(&payload) {
                debug!(fingerprint, "cache hit after waiting on in-flight computation");
                METRICS.cache_events.with_label_values(&["hit"]).inc();
                return Ok((recommendations, CacheOutcome::Hit));
            }
        }

        METRICS.cache_events.with_label_values(&["miss"]).inc();
        let result = compute().await;
        // The lock guard drops on both paths, so a failed computation never
        // blocks future attempts on this fingerprint.
        let recommendations = match result {
            Ok(recommendations) => recommendations,
            Err(e) => {
                self.flights.remove(&key);
                return Err(e);
            }
        };

        match encode(&recommendations) {
            Some(payload) => {
                if let Err(e) = self.store.set(&key, payload, self.config.ttl()).await {
                    warn!(fingerprint, error = %e, "failed to write cache entry");
                }
            }
            None => warn!(fingerprint, "failed to encode recommendations for caching"),
        }
        self.flights.remove(&key);

        Ok((recommendations, CacheOutcome::Computed))
    }

    /// Drop every cached ranking. Called when the candidate set changes.
    pub async fn invalidate_all(&self) -> Result<()> {
        METRICS.cache_events.with_label_values(&["invalidate"]).inc();
        self.store
            .invalidate(&format!("{}:*", self.config.key_prefix))
            .await
    }
}

fn encode(recommendations: &[Recommendation]) -> Option<Bytes> {
    rmp_serde::to_vec(recommendations).ok().map(Bytes::from)
}

fn decode(payload: &Bytes) -> Option<Vec<Recommendation>> {
    rmp_serde::from_slice(payload).ok()
}
