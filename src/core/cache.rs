//! Expiring value cache shared by concurrent probes.
//!
//! Entries are evicted lazily: a lookup past the expiry instant behaves as a
//! miss and drops the stale entry. There is no background sweep.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe cache where every entry carries its own time-to-live.
///
/// Uses `tokio::time::Instant` so paused test clocks drive expiry.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a clone of the live value for `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }
        None
    }

    /// Stores `value` until `now + ttl`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .insert(key, CacheEntry { value, expires_at });
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.lock().remove(key).map(|entry| entry.value)
    }

    /// Number of stored entries, expired ones included until next lookup.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
