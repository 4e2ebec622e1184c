//! In-process cache backend using moka
//!
//! moka cannot enumerate keys by prefix, so a dashmap side index tracks every key that
//! may be live. The index maps each key to the generation of the entry that put it there.
//! It is updated before every insert and purged by the eviction listener only when the
//! evicted entry's generation still matches, so a late notice for a replaced entry never
//! drops a live key. The index is therefore always a superset of the live keys.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use moka::notification::RemovalCause;

use crate::domain::DomainError;
use crate::domain::cache::{CacheBackend, CacheEntry, ExpirationPolicy};

/// Configuration for the local cache
#[derive(Debug, Clone)]
pub struct LocalCacheConfig {
    /// Maximum number of entries before size-based eviction
    pub max_capacity: u64,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl LocalCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone)]
struct LocalEntry {
    entry: CacheEntry,
    generation: u64,
}

/// Per-entry absolute + sliding expiration
struct EntryExpiry;

impl Expiry<String, LocalEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &LocalEntry,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(value.entry.lifetime_after_access(created_at))
    }

    fn expire_after_read(
        &self,
        _key: &String,
        value: &LocalEntry,
        read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        match value.entry.sliding() {
            Some(_) => Some(value.entry.lifetime_after_access(read_at)),
            None => duration_until_expiry,
        }
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &LocalEntry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.entry.lifetime_after_access(updated_at))
    }
}

/// Single-process cache backend
///
/// Valid only within one process; replicas of the service do not see each other's
/// entries or removals.
#[derive(Debug)]
pub struct LocalCache {
    cache: MokaCache<String, LocalEntry>,
    index: Arc<DashMap<String, u64>>,
    next_generation: AtomicU64,
    config: LocalCacheConfig,
}

impl LocalCache {
    /// Creates a local cache with default configuration
    pub fn new() -> Self {
        Self::with_config(LocalCacheConfig::default())
    }

    pub fn with_config(config: LocalCacheConfig) -> Self {
        let index: Arc<DashMap<String, u64>> = Arc::new(DashMap::new());
        let listener_index = Arc::clone(&index);

        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .eviction_listener(move |key: Arc<String>, value: LocalEntry, cause| {
                if matches!(cause, RemovalCause::Replaced) {
                    return;
                }

                listener_index.remove_if(key.as_str(), |_, generation| {
                    *generation == value.generation
                });
            })
            .build();

        Self {
            cache,
            index,
            next_generation: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &LocalCacheConfig {
        &self.config
    }

    /// Number of keys in the side index (never fewer than the live entries)
    pub fn indexed_keys(&self) -> usize {
        self.index.len()
    }

    /// Number of live entries after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Removes `key` if it still holds an entry, keeping the index consistent
    ///
    /// Two writers can finish in the opposite order of their index inserts, leaving a
    /// generation in the index that the map does not hold. Once the map has no entry
    /// the index key is dropped whatever its generation; `set_raw` re-indexes a write
    /// that lands afterwards.
    async fn remove_entry(&self, key: &str) -> bool {
        let live = self.cache.contains_key(key);
        let removed = self.cache.remove(key).await;

        if !self.cache.contains_key(key) {
            self.index.remove(key);
        }

        match removed {
            Some(removed) => live && !removed.entry.is_expired(),
            None => false,
        }
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for LocalCache {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Bytes>, DomainError> {
        match self.cache.get(key).await {
            Some(local) if !local.entry.is_expired() => Ok(Some(local.entry.value().clone())),
            Some(_) => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_raw(
        &self,
        key: &str,
        value: Bytes,
        policy: ExpirationPolicy,
    ) -> Result<(), DomainError> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // Index first: a concurrent prefix removal must never miss a live key.
        self.index.insert(key.to_string(), generation);

        let entry = LocalEntry {
            entry: CacheEntry::new(value, &policy),
            generation,
        };
        self.cache.insert(key.to_string(), entry).await;

        // A concurrent remove may have dropped the index key between the two inserts.
        if self
            .cache
            .get(key)
            .await
            .is_some_and(|stored| stored.generation == generation)
        {
            self.index.entry(key.to_string()).or_insert(generation);
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.remove_entry(key).await)
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        // Collect first so no shard guard is held across an await.
        let candidates: Vec<String> = self
            .index
            .iter()
            .filter(|item| item.key().starts_with(prefix))
            .map(|item| item.key().clone())
            .collect();

        let mut removed = 0;

        for key in candidates {
            if self.remove_entry(&key).await {
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CacheContext, CacheStore};
    use serde::{Deserialize, Serialize};

    fn bytes(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    fn minutes(n: u64) -> ExpirationPolicy {
        ExpirationPolicy::new(Duration::from_secs(n * 60))
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = LocalCache::new();

        cache.set_raw("key1", bytes("value1"), minutes(1)).await.unwrap();

        let result = cache.get_raw("key1").await.unwrap();
        assert_eq!(result, Some(bytes("value1")));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = LocalCache::new();

        assert!(cache.get_raw("never-set").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let cache = LocalCache::new();

        cache.set_raw("key1", bytes("old"), minutes(1)).await.unwrap();
        cache.set_raw("key1", bytes("new"), minutes(1)).await.unwrap();

        assert_eq!(cache.get_raw("key1").await.unwrap(), Some(bytes("new")));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let cache = LocalCache::new();

        cache.set_raw("key1", bytes("value1"), minutes(1)).await.unwrap();

        assert!(cache.remove("key1").await.unwrap());
        assert!(!cache.remove("key1").await.unwrap());
        assert!(cache.get_raw("key1").await.unwrap().is_none());
        assert_eq!(cache.indexed_keys(), 0);
    }

    #[tokio::test]
    async fn test_absolute_ttl_expiration() {
        let cache = LocalCache::new();

        cache
            .set_raw("key1", bytes("value1"), ExpirationPolicy::new(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get_raw("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get_raw("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unread_entry_expires_after_sliding_window() {
        let cache = LocalCache::new();
        let policy =
            ExpirationPolicy::new(Duration::from_secs(60)).with_sliding(Duration::from_millis(50));

        cache.set_raw("key1", bytes("value1"), policy).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(cache.get_raw("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_renew_sliding_window() {
        let cache = LocalCache::new();
        let policy =
            ExpirationPolicy::new(Duration::from_secs(60)).with_sliding(Duration::from_millis(300));

        cache.set_raw("key1", bytes("value1"), policy).await.unwrap();

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(cache.get_raw("key1").await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_sliding_renewal_is_capped_by_absolute_ttl() {
        let cache = LocalCache::new();
        let policy = ExpirationPolicy::new(Duration::from_millis(250))
            .with_sliding(Duration::from_millis(200));

        cache.set_raw("key1", bytes("value1"), policy).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get_raw("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.get_raw("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_by_prefix_is_exact() {
        let cache = LocalCache::new();

        for key in ["products:1", "products:paged:1:10", "productsx:1", "categories:9"] {
            cache.set_raw(key, bytes("v"), minutes(1)).await.unwrap();
        }

        let removed = cache.remove_by_prefix("products:").await.unwrap();
        assert_eq!(removed, 2);

        assert!(cache.get_raw("products:1").await.unwrap().is_none());
        assert!(cache.get_raw("products:paged:1:10").await.unwrap().is_none());
        assert!(cache.get_raw("productsx:1").await.unwrap().is_some());
        assert!(cache.get_raw("categories:9").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_by_prefix_with_no_matches() {
        let cache = LocalCache::new();

        cache.set_raw("categories:9", bytes("v"), minutes(1)).await.unwrap();

        assert_eq!(cache.remove_by_prefix("products:").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_replacement_keeps_key_indexed() {
        let cache = LocalCache::new();

        cache.set_raw("products:1", bytes("a"), minutes(1)).await.unwrap();
        cache.set_raw("products:1", bytes("b"), minutes(1)).await.unwrap();
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.indexed_keys(), 1);
        assert_eq!(cache.remove_by_prefix("products:").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_drops_index_key_left_by_out_of_order_writers() {
        let cache = LocalCache::new();

        cache.set_raw("products:1", bytes("a"), minutes(1)).await.unwrap();
        // Second writer indexed last but its map insert landed first.
        cache.index.insert("products:1".to_string(), u64::MAX);

        assert!(cache.remove("products:1").await.unwrap());
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.indexed_keys(), 0);
        assert!(cache.get_raw("products:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_of_absent_key_drops_orphaned_index_key() {
        let cache = LocalCache::new();

        cache.index.insert("products:9".to_string(), 7);

        assert!(!cache.remove("products:9").await.unwrap());
        assert_eq!(cache.indexed_keys(), 0);
    }

    #[tokio::test]
    async fn test_set_after_remove_is_indexed() {
        let cache = LocalCache::new();

        cache.set_raw("products:1", bytes("a"), minutes(1)).await.unwrap();
        cache.remove("products:1").await.unwrap();
        cache.set_raw("products:1", bytes("b"), minutes(1)).await.unwrap();
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.indexed_keys(), 1);
        assert_eq!(cache.remove_by_prefix("products:").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_leave_the_index() {
        let cache = LocalCache::new();

        for key in ["products:1", "products:2"] {
            cache
                .set_raw(key, bytes("v"), ExpirationPolicy::new(Duration::from_millis(30)))
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.indexed_keys(), 0);
        assert_eq!(cache.remove_by_prefix("products:").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_index_covers_live_entries_under_capacity_pressure() {
        let cache = LocalCache::with_config(LocalCacheConfig::default().with_max_capacity(10));

        for i in 0..50 {
            cache
                .set_raw(&format!("products:{}", i), bytes("v"), minutes(1))
                .await
                .unwrap();
        }

        let live = cache.entry_count().await;
        assert!(live <= 10);
        assert!(cache.indexed_keys() as u64 >= live);
    }

    #[tokio::test]
    async fn test_concurrent_writers_then_prefix_removal() {
        let cache = Arc::new(LocalCache::new());
        let mut handles = Vec::new();

        for task in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    let product = format!("products:{}:{}", task, i);
                    let category = format!("categories:{}:{}", task, i);
                    cache.set_raw(&product, bytes("p"), minutes(1)).await.unwrap();
                    cache.set_raw(&category, bytes("c"), minutes(1)).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.remove_by_prefix("products:").await.unwrap(), 200);
        assert_eq!(cache.remove_by_prefix("categories:").await.unwrap(), 200);
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: String,
        name: String,
    }

    fn store() -> CacheStore {
        CacheStore::new(Arc::new(LocalCache::new()))
    }

    #[tokio::test]
    async fn test_store_roundtrip_product() {
        let store = store();
        let ctx = CacheContext::new();
        let widget = Product {
            id: "1".to_string(),
            name: "Widget".to_string(),
        };

        store
            .set(&ctx, "products:1", &widget, Some(minutes(5)))
            .await
            .unwrap();

        let cached: Option<Product> = store.get(&ctx, "products:1").await.unwrap();
        assert_eq!(cached, Some(widget));
    }

    #[tokio::test]
    async fn test_store_prefix_removal_spares_other_collections() {
        let store = store();
        let ctx = CacheContext::new();

        store.set(&ctx, "products:1", &"P1", None).await.unwrap();
        store.set(&ctx, "categories:9", &"C9", None).await.unwrap();

        assert_eq!(store.remove_by_prefix(&ctx, "products:").await.unwrap(), 1);

        assert!(store.get::<String>(&ctx, "products:1").await.unwrap().is_none());
        assert_eq!(
            store.get::<String>(&ctx, "categories:9").await.unwrap(),
            Some("C9".to_string())
        );
    }

    #[tokio::test]
    async fn test_store_get_or_create_runs_factory_once() {
        let store = store();
        let ctx = CacheContext::new();
        let calls = std::sync::atomic::AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<u32, DomainError> = store
                .get_or_create(&ctx, "dashboard:stats", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value.unwrap(), 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_get_or_create_does_not_cache_factory_errors() {
        let store = store();
        let ctx = CacheContext::new();

        let failed: Result<u32, DomainError> = store
            .get_or_create(&ctx, "dashboard:stats", None, || async {
                Err(DomainError::storage("boom"))
            })
            .await;
        assert!(failed.is_err());

        assert!(store.get::<u32>(&ctx, "dashboard:stats").await.unwrap().is_none());
    }
}
