//! In-process cache provider.
//!
//! Backed by a `DashMap` with per-entry expiry. Expired entries are treated
//! as absent on read and removed on access, or in bulk by the sweeper task
//! started with [`spawn_sweeper`]. Keys that are written but never read
//! again (item keys) are only reclaimed by the sweeper.
//!
//! [`spawn_sweeper`]: InMemoryCacheBackend::spawn_sweeper

use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheBackend;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Thread-safe in-memory cache with TTL.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCacheBackend {
    inner: Arc<DashMap<String, Entry>>,
}

impl InMemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.inner)
    }

    /// Purge expired entries every `period` until `shutdown` fires or the
    /// cache is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn spawn_sweeper(
        &self,
        period: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let map: Weak<DashMap<String, Entry>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(map) = map.upgrade() else { break };
                        let removed = purge(&map);
                        if removed > 0 {
                            debug!(removed, remaining = map.len(), "Expired cache entries swept");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
            debug!("Cache sweeper stopped");
        })
    }
}

fn purge(map: &DashMap<String, Entry>) -> usize {
    let now = Instant::now();
    let before = map.len();
    map.retain(|_, entry| entry.is_live(now));
    before.saturating_sub(map.len())
}

impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        let value = match self.inner.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if value.is_none() {
            self.inner.remove_if(key, |_, entry| !entry.is_live(now));
            debug!(key, "Expired entry evicted");
        }
        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, ttl: Duration, value: &str) -> CacheResult<()> {
        self.inner.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.inner.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        let removed = keys
            .iter()
            .filter(|key| self.inner.remove(key.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .inner
            .iter()
            .filter(|r| r.value().is_live(now) && glob_match(pattern, r.key()))
            .map(|r| r.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Redis-style glob match supporting `*` (any run) and `?` (one char).
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let c: Vec<char> = candidate.chars().collect();
    let (mut pi, mut ci) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut resume = 0usize;

    while ci < c.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == c[ci]) {
            pi += 1;
            ci += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            resume = ci;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            resume += 1;
            ci = resume;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("todos:user:*", "todos:user:johnd"));
        assert!(glob_match("todos:user:*", "todos:user:"));
        assert!(!glob_match("todos:user:*", "todo:1"));
        assert!(glob_match("todo:?", "todo:1"));
        assert!(!glob_match("todo:?", "todo:12"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("t*:*:j*d", "todos:user:johnd"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryCacheBackend::new();
        cache
            .set_with_expiry("todo:1", Duration::from_secs(60), "{\"id\":1}")
            .await
            .unwrap();

        let cached = cache.get("todo:1").await.unwrap();
        assert_eq!(cached.as_deref(), Some("{\"id\":1}"));

        cache.delete("todo:1").await.unwrap();
        assert!(cache.get("todo:1").await.unwrap().is_none());
        // Deleting again is fine.
        cache.delete("todo:1").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = InMemoryCacheBackend::new();
        cache
            .set_with_expiry("todo:1", Duration::from_secs(300), "v")
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get("todo:1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("todo:1").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_and_pattern_skip_expired() {
        let cache = InMemoryCacheBackend::new();
        let short = Duration::from_secs(10);
        cache.set_with_expiry("todo:1", short, "a").await.unwrap();
        cache.set_with_expiry("todo:2", Duration::from_secs(100), "b").await.unwrap();

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(
            cache.keys_matching("todo:*").await.unwrap(),
            vec!["todo:2".to_string()]
        );
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_reclaims_unread_entries() {
        let cache = InMemoryCacheBackend::new();
        let (tx, rx) = broadcast::channel(1);
        let sweeper = cache.spawn_sweeper(Duration::from_secs(60), rx);

        for id in 0..1000 {
            cache
                .set_with_expiry(&format!("todo:{id}"), Duration::from_secs(300), "{}")
                .await
                .unwrap();
        }
        cache
            .set_with_expiry("todos:user:johnd", Duration::from_secs(3_600), "[]")
            .await
            .unwrap();
        assert_eq!(cache.len(), 1001);

        // Nothing is read back; only the sweeper can shrink the map.
        tokio::time::sleep(Duration::from_secs(400)).await;
        assert_eq!(cache.len(), 1);

        tx.send(()).unwrap();
        sweeper.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_when_cache_dropped() {
        let cache = InMemoryCacheBackend::new();
        let (_tx, rx) = broadcast::channel(1);
        let sweeper = cache.spawn_sweeper(Duration::from_secs(60), rx);

        drop(cache);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(sweeper.is_finished());
    }

    #[tokio::test]
    async fn test_delete_many_counts_existing() {
        let cache = InMemoryCacheBackend::new();
        cache.set_with_expiry("a", Duration::from_secs(10), "1").await.unwrap();
        cache.set_with_expiry("b", Duration::from_secs(10), "2").await.unwrap();

        let removed = cache
            .delete_many(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(cache.is_empty());
    }
}
