// src/services/cache.rs
// DOCUMENTATION: In-memory TTL cache for list pages
// PURPOSE: Serve the home page and place listings without hitting the database
// on every request; writes that change counters invalidate the affected entries

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Key prefix for the home page payload
pub const HOME_CACHE: &str = "home:";
/// Key prefix for place listings
pub const PLACE_CACHE: &str = "places:";

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Timestamped JSON blobs with a fixed expiry
/// DOCUMENTATION: Shared across workers behind an Arc
pub struct ListCache {
    store: Arc<RwLock<HashMap<String, CacheEntry<String>>>>,
    default_ttl: Duration,
}

impl ListCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Get cached value
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                log::debug!("Cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                log::debug!("Cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    /// Typed read; an entry that no longer deserializes counts as a miss
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Set cached value with default TTL
    pub async fn set(&self, key: String, value: String) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_json<T: Serialize>(&self, key: String, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw).await,
            Err(e) => log::warn!("Could not cache {}: {}", key, e),
        }
    }

    /// Set cached value with custom TTL
    pub async fn set_with_ttl(&self, key: String, value: String, ttl: Duration) {
        let mut store = self.store.write().await;
        log::debug!("Cache SET for key: {} (TTL: {}s)", key, ttl.as_secs());
        store.insert(key, CacheEntry::new(value, ttl));
    }

    /// Drop every entry whose key starts with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|key, _| !key.starts_with(prefix));
        let removed = before - store.len();
        if removed > 0 {
            log::debug!("Cache invalidated {} entries under {}", removed, prefix);
        }
        removed
    }

    /// Invalidate everything derived from place rows
    pub async fn invalidate_places(&self) {
        self.invalidate_prefix(HOME_CACHE).await;
        self.invalidate_prefix(PLACE_CACHE).await;
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<ListCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = ListCache::new(60);
        cache.set("home:v1".to_string(), "[1,2]".to_string()).await;

        assert_eq!(cache.get("home:v1").await, Some("[1,2]".to_string()));
        assert_eq!(cache.get_json::<Vec<i32>>("home:v1").await, Some(vec![1, 2]));
        assert_eq!(cache.get_json::<String>("home:v1").await, None);
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = ListCache::new(60);
        cache
            .set_with_ttl("k".to_string(), "v".to_string(), Duration::from_millis(50))
            .await;

        assert!(cache.get("k").await.is_some());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("k").await.is_none());

        cache.cleanup().await;
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_invalidate_places_keeps_other_namespaces() {
        let cache = ListCache::new(60);
        cache.set_json(format!("{}v1", HOME_CACHE), &1).await;
        cache.set_json(format!("{}region=1", PLACE_CACHE), &2).await;
        cache.set_json(format!("{}region=2", PLACE_CACHE), &3).await;
        cache.set_json("regions:all".to_string(), &4).await;

        assert_eq!(cache.invalidate_prefix(PLACE_CACHE).await, 2);
        cache.invalidate_places().await;

        let stats = cache.stats().await;
        assert_eq!(stats.active_entries, 1);
        assert!(cache.get("regions:all").await.is_some());
    }
}
