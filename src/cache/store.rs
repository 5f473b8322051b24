//! Cache-aside store.
//!
//! Best-effort typed access to a [`CacheBackend`]. The primary store stays
//! the source of truth; this layer only ever degrades:
//!
//! ```text
//! get     backend error / miss / bad payload  → None
//! set     backend error                       → logged, dropped
//! delete  backend error                       → logged, dropped
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::CacheBackend;
use crate::observability::metrics;

/// TTL applied when the caller does not pick one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Counters since the store was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Backend or decoding errors swallowed by the store.
    pub errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

/// Typed, failure-tolerant wrapper around a cache backend.
#[derive(Debug)]
pub struct CacheAsideStore<B> {
    backend: B,
    default_ttl: Duration,
    counters: Counters,
}

impl<B: CacheBackend> CacheAsideStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_default_ttl(backend, DEFAULT_TTL)
    }

    pub fn with_default_ttl(backend: B, default_ttl: Duration) -> Self {
        Self {
            backend,
            default_ttl,
            counters: Counters::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
        }
    }

    /// Look up `key`. Never fails: errors and undecodable payloads are misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Cache MISS");
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_request("miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Cache get error, treating as miss");
                self.record_error("get");
                metrics::record_cache_request("error");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Cache HIT");
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_request("hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Undecodable cache entry, treating as miss");
                self.record_error("decode");
                metrics::record_cache_request("error");
                None
            }
        }
    }

    /// Store `value` with the default TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Store `value` with an explicit TTL. Failures are logged and dropped.
    pub async fn set_with_ttl<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Cache value not serializable, skipping set");
                self.record_error("encode");
                return;
            }
        };

        match self.backend.set_with_expiry(key, ttl, &payload).await {
            Ok(()) => debug!(key, ttl_secs = ttl.as_secs(), "Cache SET"),
            Err(e) => {
                warn!(key, error = %e, "Cache set error");
                self.record_error("set");
            }
        }
    }

    /// Invalidate one key. Failures are logged and dropped.
    pub async fn delete(&self, key: &str) {
        match self.backend.delete(key).await {
            Ok(()) => debug!(key, "Cache DELETE"),
            Err(e) => {
                warn!(key, error = %e, "Cache delete error");
                self.record_error("delete");
            }
        }
    }

    /// Invalidate every key matching `pattern` in one batch.
    ///
    /// Returns the number of keys removed (0 on error or empty match).
    pub async fn delete_by_pattern(&self, pattern: &str) -> u64 {
        let keys = match self.backend.keys_matching(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(pattern, error = %e, "Cache delete pattern error");
                self.record_error("keys");
                return 0;
            }
        };

        if keys.is_empty() {
            return 0;
        }

        match self.backend.delete_many(&keys).await {
            Ok(removed) => {
                debug!(pattern, removed, "Cache DELETE pattern");
                removed
            }
            Err(e) => {
                warn!(pattern, error = %e, "Cache delete pattern error");
                self.record_error("delete_many");
                0
            }
        }
    }

    /// Backend reachability; an erroring health check reads as unhealthy.
    pub async fn health_check(&self) -> bool {
        match self.backend.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(
                    error = %e,
                    provider = self.backend.provider_name(),
                    "Cache health check failed"
                );
                false
            }
        }
    }

    fn record_error(&self, op: &'static str) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_error(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::errors::{CacheError, CacheResult};
    use crate::cache::providers::InMemoryCacheBackend;

    /// Backend that fails every call.
    struct BrokenBackend;

    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::ConnectionError("refused".into()))
        }
        async fn set_with_expiry(&self, _k: &str, _t: Duration, _v: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".into()))
        }
        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".into()))
        }
        async fn delete_many(&self, _keys: &[String]) -> CacheResult<u64> {
            Err(CacheError::ConnectionError("refused".into()))
        }
        async fn keys_matching(&self, _pattern: &str) -> CacheResult<Vec<String>> {
            Err(CacheError::ConnectionError("refused".into()))
        }
        async fn health_check(&self) -> CacheResult<bool> {
            Err(CacheError::ConnectionError("refused".into()))
        }
        fn provider_name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = CacheAsideStore::new(InMemoryCacheBackend::new());
        store
            .set_with_ttl("todos:user:johnd", &vec![1u64, 2, 3], Duration::from_secs(600))
            .await;

        let cached: Option<Vec<u64>> = store.get("todos:user:johnd").await;
        assert_eq!(cached, Some(vec![1, 2, 3]));
        assert_eq!(store.stats().hits, 1);

        store.delete("todos:user:johnd").await;
        let cached: Option<Vec<u64>> = store.get("todos:user:johnd").await;
        assert!(cached.is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_applies() {
        let store = CacheAsideStore::new(InMemoryCacheBackend::new());
        store.set("todo:1", "hello").await;

        tokio::time::advance(DEFAULT_TTL - Duration::from_secs(1)).await;
        assert_eq!(store.get::<String>("todo:1").await.as_deref(), Some("hello"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.get::<String>("todo:1").await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let backend = InMemoryCacheBackend::new();
        backend
            .set_with_expiry("todo:1", Duration::from_secs(60), "not json")
            .await
            .unwrap();
        let store = CacheAsideStore::new(backend);

        assert!(store.get::<Vec<u64>>("todo:1").await.is_none());
        assert_eq!(store.stats().errors, 1);
    }

    #[tokio::test]
    async fn test_broken_backend_never_raises() {
        let store = CacheAsideStore::new(BrokenBackend);

        assert!(store.get::<String>("k").await.is_none());
        store.set("k", "v").await;
        store.delete("k").await;
        assert_eq!(store.delete_by_pattern("todo:*").await, 0);
        assert!(!store.health_check().await);
        assert_eq!(store.stats().errors, 4);
    }

    #[tokio::test]
    async fn test_delete_by_pattern() {
        let store = CacheAsideStore::new(InMemoryCacheBackend::new());
        store.set("todo:1", &1).await;
        store.set("todo:2", &2).await;
        store.set("todos:user:johnd", &Vec::<u64>::new()).await;

        assert_eq!(store.delete_by_pattern("todo:*").await, 2);
        assert!(store.get::<u64>("todo:1").await.is_none());
        assert!(store.get::<Vec<u64>>("todos:user:johnd").await.is_some());

        // Empty match set is a no-op.
        assert_eq!(store.delete_by_pattern("nothing:*").await, 0);
    }
}
