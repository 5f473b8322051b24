//! Cache error types.
//!
//! These never escape [`CacheAsideStore`](crate::cache::CacheAsideStore);
//! they exist so backends can report what went wrong before the store
//! logs and swallows it.

use thiserror::Error;

/// Errors a cache backend can report.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache backend.
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Failed to serialize or deserialize a cached value.
    #[error("Cache serialization error: {0}")]
    SerializationError(String),

    /// Generic backend failure.
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}

/// Result type for cache backend operations.
pub type CacheResult<T> = Result<T, CacheError>;
