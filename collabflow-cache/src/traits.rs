//! Cache backend trait.
//!
//! Backends store serialized payloads under string keys with an absolute
//! expiry. Implementations must be safe for concurrent access; single-key
//! operations must be atomic.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Error produced by a cache backend.
///
/// Backend failures never fail a request: callers log and fall through to
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend could not serve the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Pluggable cache backend for serialized listing payloads.
///
/// # Contract
///
/// - `get` never returns a value past its expiry.
/// - `set` always records an expiry; there is no "cache forever".
/// - `delete` on an absent key is a no-op, not an error.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get the payload stored under `key`, if present and unexpired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `payload` under `key` with the given time-to-live.
    async fn set(&self, key: &str, payload: String, ttl: Duration) -> CacheResult<()>;

    /// Remove the entry under `key`. Absent keys are ignored.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}
