use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::debug;

use crate::query::QueryResult;

struct CachedResult {
    result: QueryResult,
    stored_at: Instant,
}

/// Query-result cache keyed by SQL text.
///
/// Entries expire `ttl` after they were stored; the least recently used
/// entry is evicted once `capacity` is reached. Owned by whoever runs the
/// queries and refreshed with [`QueryCache::clear`].
pub struct QueryCache {
    entries: Mutex<LruCache<String, CachedResult>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CachedResult>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cached result for `sql`, if present and not expired.
    pub fn get(&self, sql: &str) -> Option<QueryResult> {
        let mut entries = self.lock();
        let expired = match entries.get(sql) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.result.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(sql);
            debug!("cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn put(&self, sql: &str, result: QueryResult) {
        self.lock().put(
            sql.to_string(),
            CachedResult {
                result,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, sql: &str) -> bool {
        self.lock().pop(sql).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
