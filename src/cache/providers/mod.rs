//! Concrete cache backends.

pub mod memory;
pub mod noop;

#[cfg(feature = "cache-redis")]
pub mod redis;

pub use memory::InMemoryCacheBackend;
pub use noop::NoOpCacheBackend;

#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCacheBackend;
