//! In-process TTL cache for generative responses.
//!
//! Per-entry expiry with lazy eviction: a read that finds an expired
//! entry deletes it, and `stats()` sweeps before reporting so the
//! numbers only reflect live entries. Nothing here is persisted; the
//! cache rebuilds from empty on process restart.

use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// Live-entry snapshot reported by [`TtlCache::stats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Thread-safe response cache with per-entry TTL expiration
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entry_count", &self.entries.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl TtlCache {
    /// Create a cache whose entries default to `default_ttl` when `set`
    /// does not specify one.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Store a value, unconditionally replacing any entry under `key`.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
        debug!(key = key, ttl_seconds = ttl.as_secs(), "Cache SET");
    }

    /// Return the stored value if present and unexpired.
    ///
    /// A found-but-expired entry is deleted before returning `None` so
    /// stale entries do not accumulate.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                debug!(key = key, "Cache HIT");
                return Some(entry.value.clone());
            }
            drop(entry);
            self.entries.remove(key);
            debug!(key = key, "Cache EXPIRED");
            return None;
        }
        debug!(key = key, "Cache MISS");
        None
    }

    /// Same expiry semantics as [`get`](Self::get) without cloning the value.
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return true;
            }
            drop(entry);
            self.entries.remove(key);
        }
        false
    }

    /// Unconditionally empty the cache.
    pub fn clear(&self) {
        self.entries.clear();
        debug!("Cache CLEAR");
    }

    /// Sweep expired entries, then report live size and keys.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}
