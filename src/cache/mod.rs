//! Cache-aside subsystem.
//!
//! # Architecture
//! ```text
//! CacheAsideStore<B>            typed, best-effort get/set/delete
//!   └── B: CacheBackend
//!         CacheProvider (enum)  chosen from config
//!           ├── Memory          DashMap + TTL
//!           ├── Redis           ConnectionManager (feature cache-redis)
//!           └── NoOp            always miss
//! ```
//!
//! # Design Decisions
//! - The cache is never authoritative; every failure degrades to a miss or
//!   a no-op and never reaches the caller
//! - Pattern deletion enumerates, then deletes in one batch
//! - Keys are namespaced by pure builder functions in keys.rs

pub mod errors;
pub mod keys;
pub mod provider;
pub mod providers;
pub mod store;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use keys::{collection_key, item_key};
pub use provider::CacheProvider;
pub use providers::{InMemoryCacheBackend, NoOpCacheBackend};
pub use store::{CacheAsideStore, CacheStats, DEFAULT_TTL};
pub use traits::CacheBackend;

#[cfg(feature = "cache-redis")]
pub use providers::RedisCacheBackend;
