//! TTL cache implementation

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A live entry; `None` is a cached negative result
    Hit(Option<Value>),
    /// No live entry
    Miss,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Option<Value>,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Bounded cache with per-entry expiry
#[derive(Debug)]
pub struct FieldCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_keys: usize,
}

impl Default for FieldCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldCache {
    /// Default key limit
    pub const DEFAULT_MAX_KEYS: usize = 1000;

    /// Create an empty cache with the default key limit
    pub fn new() -> Self {
        Self::with_max_keys(Self::DEFAULT_MAX_KEYS)
    }

    /// Create an empty cache holding at most `max_keys` entries
    pub fn with_max_keys(max_keys: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_keys,
        }
    }

    /// Look up a key, ignoring expired entries
    pub fn get(&self, key: &str) -> CacheLookup {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => CacheLookup::Hit(entry.value.clone()),
            _ => CacheLookup::Miss,
        }
    }

    /// Store a value; returns false when the cache is full
    ///
    /// Expired entries are purged before giving up on a full cache.
    pub fn set(&self, key: impl Into<String>, value: Option<Value>, ttl: Duration) -> bool {
        let key = key.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(&key) && entries.len() >= self.max_keys {
            let now = Instant::now();
            entries.retain(|_, entry| entry.is_live(now));
            if entries.len() >= self.max_keys {
                debug!("Field cache full ({} keys), not caching {}", self.max_keys, key);
                return false;
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        true
    }

    /// Remove a key
    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).is_some()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
