// In-memory response cache.
// Bounded store with least-recently-used eviction, shared across tool calls.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

/// Default number of responses kept in memory.
pub const DEFAULT_CAPACITY: usize = 128;

/// A cached response and its position in the recency order.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    position: u64,
}

#[derive(Debug)]
struct LruState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Recency order: smallest position is the least recently used.
    order: BTreeMap<u64, String>,
    clock: u64,
}

impl<V> Default for LruState<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            clock: 0,
        }
    }
}

impl<V> LruState<V> {
    fn touch(&mut self, key: &str) -> Option<&CacheEntry<V>> {
        self.clock += 1;
        let clock = self.clock;
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.position);
        entry.position = clock;
        self.order.insert(clock, key.to_string());
        Some(entry)
    }

    fn evict_lru(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Bounded key/value store with LRU eviction.
///
/// Capacity is fixed at construction. Entries never expire by time; they
/// live until pushed out by newer entries or the process exits. All access
/// goes through an internal lock because a `get` reorders entries.
#[derive(Debug)]
pub struct CacheStore<V> {
    maxsize: usize,
    state: Mutex<LruState<V>>,
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<V: Clone> CacheStore<V> {
    /// Create an empty store holding at most `maxsize` entries.
    pub fn new(maxsize: usize) -> Self {
        Self {
            maxsize,
            state: Mutex::new(LruState::default()),
        }
    }

    /// Look up a value, marking it most recently used on hit.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.lock();
        state.touch(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite a value, evicting the least recently used entry
    /// if the store grows past capacity.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut state = self.state.lock();

        if let Some(previous) = state.entries.remove(&key) {
            state.order.remove(&previous.position);
        }

        state.clock += 1;
        let position = state.clock;
        state.order.insert(position, key.clone());
        state.entries.insert(key, CacheEntry { value, position });

        if state.entries.len() > self.maxsize {
            if let Some(evicted) = state.evict_lru() {
                tracing::debug!(key = %evicted, "evicted least recently used response");
            }
        }
    }

    /// Check for a key without affecting recency.
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity the store never grows past.
    pub fn maxsize(&self) -> usize {
        self.maxsize
    }

    /// Keys ordered from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().order.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_get_miss_has_no_side_effect() {
        let cache = CacheStore::new(2);
        cache.set("a", json!(1));
        cache.set("b", json!(2));

        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_recency_refreshed_by_get() {
        let cache = CacheStore::new(2);
        cache.set("a", json!("A"));
        cache.set("b", json!("B"));
        assert_eq!(cache.get("a"), Some(json!("A")));
        cache.set("c", json!("C"));

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_overwrite_refreshes_and_does_not_grow() {
        let cache = CacheStore::new(2);
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.set("a", json!(10));
        assert_eq!(cache.len(), 2);

        cache.set("c", json!(3));
        assert_eq!(cache.keys(), vec!["a", "c"]);
        assert_eq!(cache.get("a"), Some(json!(10)));
    }

    #[test]
    fn test_capacity_invariant_evicts_one_at_a_time() {
        let cache = CacheStore::new(3);
        for i in 0..20usize {
            cache.set(format!("k{}", i), json!(i));
            assert!(cache.len() <= cache.maxsize());
            // Touch an older key so eviction order is not plain insertion order
            if i % 4 == 0 {
                cache.get(&format!("k{}", i.saturating_sub(1)));
            }
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_eviction_picks_least_recently_touched() {
        let cache = CacheStore::new(3);
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.set("c", json!(3));
        cache.get("a");
        cache.get("b");

        cache.set("d", json!(4));
        assert!(!cache.contains("c"));

        cache.set("e", json!(5));
        assert!(!cache.contains("a"));
        assert_eq!(cache.keys(), vec!["b", "d", "e"]);
    }

    #[test]
    fn test_default_capacity() {
        let cache: CacheStore<Value> = CacheStore::default();
        assert_eq!(cache.maxsize(), 128);
        assert!(cache.is_empty());
    }
}
