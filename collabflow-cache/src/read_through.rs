//! Read-through logic for listing payloads.
//!
//! The cached value is the serialized response body itself: a hit returns
//! exactly the bytes the populating read produced. Backend failures are
//! logged and degrade to a direct store query; the response is then served
//! uncached.

use crate::traits::CacheBackend;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of truth for a listing payload.
///
/// Implementations query the store and serialize the result. The error
/// type is the caller's; store failures propagate unchanged.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    type Error;

    /// Produce the serialized listing payload from the store.
    async fn fetch(&self) -> Result<String, Self::Error>;
}

/// A listing payload together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRead {
    payload: String,
    from_cache: bool,
}

impl ListingRead {
    /// The serialized payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Consume the read, yielding the payload.
    pub fn into_payload(self) -> String {
        self.payload
    }

    /// Whether the payload was served from cache.
    pub fn was_cache_hit(&self) -> bool {
        self.from_cache
    }
}

/// Read-through cache over a pluggable backend.
pub struct ReadThroughCache<C: CacheBackend> {
    backend: Arc<C>,
}

impl<C: CacheBackend> ReadThroughCache<C> {
    pub fn new(backend: Arc<C>) -> Self {
        Self { backend }
    }

    /// Get a reference to the backend.
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Serve `key` from cache, falling back to the fetcher on a miss.
    ///
    /// On a miss the fetched payload is stored under `key` with `ttl`
    /// before being returned. If the backend fails on either the read or
    /// the write, the request proceeds against the store alone and the
    /// response is not cached.
    pub async fn get_or_fetch<F>(
        &self,
        key: &str,
        ttl: Duration,
        fetcher: &F,
    ) -> Result<ListingRead, F::Error>
    where
        F: ListingFetcher,
    {
        let cacheable = match self.backend.get(key).await {
            Ok(Some(payload)) => {
                debug!(key, "Listing cache hit");
                return Ok(ListingRead {
                    payload,
                    from_cache: true,
                });
            }
            Ok(None) => true,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, serving from store");
                false
            }
        };

        let payload = fetcher.fetch().await?;

        if cacheable {
            if let Err(e) = self.backend.set(key, payload.clone(), ttl).await {
                warn!(key, error = %e, "Cache write failed, response served uncached");
            }
        }

        Ok(ListingRead {
            payload,
            from_cache: false,
        })
    }
}

impl<C: CacheBackend> Clone for ReadThroughCache<C> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCache;
    use crate::traits::{CacheError, CacheResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher that counts how many times the store was queried.
    struct CountingFetcher {
        payload: String,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(payload: &str) -> Self {
            Self {
                payload: payload.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListingFetcher for CountingFetcher {
        type Error = std::convert::Infallible;

        async fn fetch(&self) -> Result<String, Self::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    /// Backend that fails every operation.
    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _payload: String, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_second_read_is_byte_identical_with_one_store_query() {
        let cache = ReadThroughCache::new(Arc::new(MemoryCache::new()));
        let fetcher = CountingFetcher::new(r#"{"tasks":[1,2,3]}"#);

        let first = cache
            .get_or_fetch("tasks_cache_3_all_all", Duration::from_secs(60), &fetcher)
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("tasks_cache_3_all_all", Duration::from_secs(60), &fetcher)
            .await
            .unwrap();

        assert!(!first.was_cache_hit());
        assert!(second.was_cache_hit());
        assert_eq!(first.payload(), second.payload());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache = ReadThroughCache::new(Arc::new(MemoryCache::new()));
        let fetcher = CountingFetcher::new("[]");

        cache
            .get_or_fetch("tasks_cache_1_all_all", Duration::from_secs(60), &fetcher)
            .await
            .unwrap();
        cache
            .get_or_fetch("tasks_cache_2_all_all", Duration::from_secs(60), &fetcher)
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_broken_backend_degrades_to_store() {
        let cache = ReadThroughCache::new(Arc::new(BrokenBackend));
        let fetcher = CountingFetcher::new("[]");

        let first = cache
            .get_or_fetch("workspaces:all", Duration::from_secs(3600), &fetcher)
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("workspaces:all", Duration::from_secs(3600), &fetcher)
            .await
            .unwrap();

        // Every read hits the store while the backend is down.
        assert!(!first.was_cache_hit());
        assert!(!second.was_cache_hit());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_eviction_forces_fresh_fetch() {
        let backend = Arc::new(MemoryCache::new());
        let cache = ReadThroughCache::new(backend.clone());
        let fetcher = CountingFetcher::new("[]");

        cache
            .get_or_fetch("projects_workspace_5", Duration::from_secs(60), &fetcher)
            .await
            .unwrap();
        backend.delete("projects_workspace_5").await.unwrap();
        let read = cache
            .get_or_fetch("projects_workspace_5", Duration::from_secs(60), &fetcher)
            .await
            .unwrap();

        assert!(!read.was_cache_hit());
        assert_eq!(fetcher.calls(), 2);
    }
}
