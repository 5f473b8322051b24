//! Cache provider selection.
//!
//! Enum dispatch over the concrete backends, so services can be generic over
//! [`CacheBackend`] in tests while the binary uses one concrete type chosen
//! from configuration.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::errors::CacheResult;
use super::providers::{InMemoryCacheBackend, NoOpCacheBackend};
use super::traits::CacheBackend;
use crate::config::schema::{CacheBackendKind, CacheConfig};

#[cfg(feature = "cache-redis")]
use super::providers::RedisCacheBackend;

/// Backend chosen from configuration.
#[derive(Debug, Clone)]
pub enum CacheProvider {
    /// In-process map with TTL.
    Memory(InMemoryCacheBackend),

    /// Redis server (boxed to keep the enum small).
    #[cfg(feature = "cache-redis")]
    Redis(Box<RedisCacheBackend>),

    /// Caching disabled: always miss, always succeed.
    NoOp(NoOpCacheBackend),
}

impl CacheProvider {
    /// Build the configured backend, degrading to no-op when it cannot be
    /// created. Startup never fails because of the cache.
    pub async fn from_config_graceful(config: &CacheConfig) -> Self {
        match config.backend {
            CacheBackendKind::Memory => {
                info!("Using in-memory cache backend");
                Self::Memory(InMemoryCacheBackend::new())
            }
            CacheBackendKind::None => {
                info!("Cache disabled by configuration");
                Self::NoOp(NoOpCacheBackend::new())
            }
            CacheBackendKind::Redis => Self::create_redis(config).await,
        }
    }

    #[cfg(feature = "cache-redis")]
    async fn create_redis(config: &CacheConfig) -> Self {
        let Some(url) = config.redis_url.as_deref() else {
            warn!("Redis cache selected but no redis_url configured, caching disabled");
            return Self::NoOp(NoOpCacheBackend::new());
        };

        match RedisCacheBackend::connect(url).await {
            Ok(backend) => {
                info!("Using Redis cache backend");
                Self::Redis(Box::new(backend))
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable at startup, caching disabled");
                Self::NoOp(NoOpCacheBackend::new())
            }
        }
    }

    #[cfg(not(feature = "cache-redis"))]
    async fn create_redis(_config: &CacheConfig) -> Self {
        warn!(
            "Redis cache selected but the cache-redis feature is not compiled in, caching disabled"
        );
        Self::NoOp(NoOpCacheBackend::new())
    }

    /// Whether values are actually cached.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::NoOp(_))
    }

    /// Start periodic expiry for backends that do not expire entries
    /// themselves. Redis and no-op need none and return `None`.
    pub fn spawn_sweeper(
        &self,
        period: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> Option<JoinHandle<()>> {
        match self {
            Self::Memory(b) => Some(b.spawn_sweeper(period, shutdown)),
            _ => None,
        }
    }
}

impl CacheBackend for CacheProvider {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self {
            Self::Memory(b) => b.get(key).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(b) => b.get(key).await,
            Self::NoOp(b) => b.get(key).await,
        }
    }

    async fn set_with_expiry(&self, key: &str, ttl: Duration, value: &str) -> CacheResult<()> {
        match self {
            Self::Memory(b) => b.set_with_expiry(key, ttl, value).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(b) => b.set_with_expiry(key, ttl, value).await,
            Self::NoOp(b) => b.set_with_expiry(key, ttl, value).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match self {
            Self::Memory(b) => b.delete(key).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(b) => b.delete(key).await,
            Self::NoOp(b) => b.delete(key).await,
        }
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        match self {
            Self::Memory(b) => b.delete_many(keys).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(b) => b.delete_many(keys).await,
            Self::NoOp(b) => b.delete_many(keys).await,
        }
    }

    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>> {
        match self {
            Self::Memory(b) => b.keys_matching(pattern).await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(b) => b.keys_matching(pattern).await,
            Self::NoOp(b) => b.keys_matching(pattern).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match self {
            Self::Memory(b) => b.health_check().await,
            #[cfg(feature = "cache-redis")]
            Self::Redis(b) => b.health_check().await,
            Self::NoOp(b) => b.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Self::Memory(b) => b.provider_name(),
            #[cfg(feature = "cache-redis")]
            Self::Redis(b) => b.provider_name(),
            Self::NoOp(b) => b.provider_name(),
        }
    }
}
