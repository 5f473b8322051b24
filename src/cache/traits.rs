//! Cache backend trait.

use super::errors::CacheResult;
use std::future::Future;
use std::time::Duration;

/// Key-value store the cache-aside layer sits on.
///
/// Implemented by the in-memory, Redis and no-op providers, and by
/// [`CacheProvider`](crate::cache::CacheProvider) which dispatches between
/// them. Values are opaque strings (JSON in practice).
pub trait CacheBackend: Send + Sync {
    /// `Ok(Some(value))` on hit, `Ok(None)` on miss or expiry.
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<String>>> + Send;

    /// Store `value` under `key`, expiring after `ttl`.
    fn set_with_expiry(
        &self,
        key: &str,
        ttl: Duration,
        value: &str,
    ) -> impl Future<Output = CacheResult<()>> + Send;

    /// Remove a single key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = CacheResult<()>> + Send;

    /// Remove a batch of keys, returning how many existed.
    fn delete_many(&self, keys: &[String]) -> impl Future<Output = CacheResult<u64>> + Send;

    /// Enumerate live keys matching a glob pattern (`*` and `?`).
    fn keys_matching(&self, pattern: &str) -> impl Future<Output = CacheResult<Vec<String>>> + Send;

    /// Whether the backend is reachable.
    fn health_check(&self) -> impl Future<Output = CacheResult<bool>> + Send;

    /// Short provider name for logs and the admin API.
    fn provider_name(&self) -> &'static str;
}
