//! In-memory cache for non-search upstream responses.
//!
//! Reference-layer fetches are stable for hours and worth memoizing; user
//! search requests are explicitly excluded at the client level so the
//! frontend always sees fresh results. Entries carry a TTL and the map is
//! LRU-bounded, so neither memory nor staleness grows without limit.
//!
//! ## Cache Key Structure
//! Keys are the base URL plus the canonicalized (sorted) query parameters.
//!
//! ## Eviction Strategy
//! - LRU eviction when the entry limit is exceeded
//! - TTL-based expiration on read (lazy)

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::Value;
use tokio::sync::RwLock;

/// Build a deterministic cache key from the base URL and query parameters.
/// Parameter order in the request does not affect the key.
pub fn cache_key(base_url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let query = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", base_url, query)
}

/// Cached upstream response body.
struct CachedEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl CachedEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Statistics for the request cache.
#[derive(Default)]
pub struct RequestCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub expired: AtomicU64,
}

/// Concurrent-safe TTL + LRU cache of upstream JSON bodies.
pub struct RequestCache {
    entries: RwLock<LruCache<String, CachedEntry>>,
    default_ttl: Duration,
    stats: Arc<RequestCacheStats>,
}

impl RequestCache {
    /// Create a new cache bounded to `max_entries` with the given TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap();
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            default_ttl,
            stats: Arc::new(RequestCacheStats::default()),
        }
    }

    /// Get a cached body, expiring it lazily if its TTL has elapsed.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.pop(key);
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a body under the given key.
    pub async fn put(&self, key: String, value: Value) {
        let entry = CachedEntry {
            value,
            inserted_at: Instant::now(),
            ttl: self.default_ttl,
        };
        self.entries.write().await.push(key, entry);
    }

    /// Number of live entries (expired-but-unread entries included).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop all entries.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        tracing::info!(entries = count, "request cache cleared");
    }

    /// Cache statistics.
    pub fn stats(&self) -> &RequestCacheStats {
        &self.stats
    }
}
