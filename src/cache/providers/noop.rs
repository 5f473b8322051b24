//! No-op cache provider: always miss, always succeed.
//!
//! Used when caching is disabled by configuration, or when the configured
//! backend cannot be reached at startup.

use std::time::Duration;

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheBackend;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCacheBackend;

impl NoOpCacheBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CacheBackend for NoOpCacheBackend {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_with_expiry(&self, _key: &str, _ttl: Duration, _value: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn delete_many(&self, _keys: &[String]) -> CacheResult<u64> {
        Ok(0)
    }

    async fn keys_matching(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
