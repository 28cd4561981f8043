//! In-memory cache backend.
//!
//! Entries live in a concurrent map and expire lazily: an expired entry is
//! treated as a miss and removed on the read that observes it. The clock is
//! injectable so expiry can be tested deterministically.

use crate::traits::{CacheBackend, CacheResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Clock abstraction for entry expiry.
pub trait CacheClock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCacheClock;

impl CacheClock for SystemCacheClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// In-memory cache backend over a concurrent hash map.
///
/// Single-key atomicity comes from the map's per-entry locking. There is
/// no background sweeper; stale entries are dropped when read.
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn CacheClock>,
}

impl MemoryCache {
    /// Create a cache using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemCacheClock))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(clock: Arc<dyn CacheClock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Number of entries currently held, including not-yet-swept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.payload.clone()));
            }
        } else {
            return Ok(None);
        }

        // Expired: sweep it and report a miss.
        self.entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) -> CacheResult<()> {
        let ttl = ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::zero());
        let entry = Entry {
            payload,
            expires_at: self.clock.now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock that can be advanced by hand.
    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        fn advance(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += ChronoDuration::seconds(secs);
        }
    }

    impl CacheClock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_stored_payload() {
        let cache = MemoryCache::new();
        cache
            .set("k", "payload".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("payload".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let clock = ManualClock::starting_at(epoch());
        let cache = MemoryCache::with_clock(clock.clone());

        cache
            .set("k", "payload".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        clock.advance(59);
        assert!(cache.get("k").await.unwrap().is_some());

        clock.advance(2);
        assert_eq!(cache.get("k").await.unwrap(), None);
        // Swept on read.
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_noop() {
        let cache = MemoryCache::new();
        cache.delete("never-set").await.unwrap();
        cache.delete("never-set").await.unwrap();
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_entry() {
        let cache = MemoryCache::new();
        cache
            .set("k", "old".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("k", "new".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }
}
