//! Sharded concurrent map.
//!
//! ## Architecture
//!
//! Keys hash to one of a fixed number of shards; each shard is a small
//! `Vec<(K, V)>` behind its own `parking_lot::RwLock`. Operations only ever
//! touch the one shard their key hashes to, so contention is bounded by how
//! many hot keys share a shard, not by the total number of callers.
//!
//! ## Get-or-create is atomic
//!
//! [`ShardedMap::get_or_insert_with`] holds the shard's write lock across the
//! lookup and the insert. Two threads racing to create the same absent key
//! therefore always observe a single entry: one thread inserts, the other
//! finds that entry and clones it. This matters when the stored value is a
//! shared lock handle — every caller must receive the *same* handle (see
//! [`LockRegistry`](crate::sync::LockRegistry)).
//!
//! Values are cloned out rather than borrowed; in practice `V` is an
//! `Arc<...>` (book sides, lock handles) or `()` (the order-id admission
//! set), so clones are cheap.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use parking_lot::RwLock;

/// Default number of shards. Plenty for per-instrument keys; memory cost per
/// empty shard is one empty Vec plus a lock.
pub const DEFAULT_SHARDS: usize = 1024;

/// A concurrent associative container sharded into fixed buckets.
///
/// ## Example
///
/// ```
/// use shardbook::ShardedMap;
///
/// let map: ShardedMap<String, u32> = ShardedMap::new();
/// map.insert("AAPL".to_string(), 7);
/// assert_eq!(map.get(&"AAPL".to_string()), Some(7));
/// assert!(map.contains_key(&"AAPL".to_string()));
/// ```
#[derive(Debug)]
pub struct ShardedMap<K, V> {
    shards: Vec<RwLock<Vec<(K, V)>>>,
}

impl<K, V> Default for ShardedMap<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ShardedMap<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create a map with [`DEFAULT_SHARDS`] shards.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create a map with a specific shard count (at least 1).
    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| RwLock::new(Vec::new())).collect(),
        }
    }

    fn shard_for(&self, key: &K) -> &RwLock<Vec<(K, V)>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Insert or replace the entry for `key`, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut shard = self.shard_for(&key).write();
        for entry in shard.iter_mut() {
            if entry.0 == key {
                return Some(std::mem::replace(&mut entry.1, value));
            }
        }
        shard.push((key, value));
        None
    }

    /// Look up `key`, cloning the stored value out.
    pub fn get(&self, key: &K) -> Option<V> {
        let shard = self.shard_for(key).read();
        shard.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    /// Look up `key`, inserting `make()` first if absent. Lookup and insert
    /// happen under one write lock, so all racing callers bind to the same
    /// stored value.
    pub fn get_or_insert_with(&self, key: &K, make: impl FnOnce() -> V) -> V
    where
        K: Clone,
    {
        let mut shard = self.shard_for(key).write();
        if let Some((_, v)) = shard.iter().find(|(k, _)| k == key) {
            return v.clone();
        }
        let value = make();
        shard.push((key.clone(), value.clone()));
        value
    }

    /// Insert `value` only if `key` is absent. Returns true if the entry was
    /// inserted, false if the key was already present.
    pub fn try_insert(&self, key: K, value: V) -> bool {
        let mut shard = self.shard_for(&key).write();
        if shard.iter().any(|(k, _)| *k == key) {
            return false;
        }
        shard.push((key, value));
        true
    }

    /// Whether an entry for `key` exists.
    pub fn contains_key(&self, key: &K) -> bool {
        let shard = self.shard_for(key).read();
        shard.iter().any(|(k, _)| k == key)
    }

    /// Remove the entry for `key`, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut shard = self.shard_for(key).write();
        let index = shard.iter().position(|(k, _)| k == key)?;
        Some(shard.swap_remove(index).1)
    }

    /// Total number of entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.read().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_get() {
        let map: ShardedMap<String, u64> = ShardedMap::new();

        assert!(map.get(&"X".to_string()).is_none());
        assert!(map.insert("X".to_string(), 1).is_none());
        assert_eq!(map.get(&"X".to_string()), Some(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let map: ShardedMap<String, u64> = ShardedMap::new();

        map.insert("X".to_string(), 1);
        assert_eq!(map.insert("X".to_string(), 2), Some(1));
        assert_eq!(map.get(&"X".to_string()), Some(2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_try_insert_only_once() {
        let map: ShardedMap<u64, ()> = ShardedMap::new();

        assert!(map.try_insert(42, ()));
        assert!(!map.try_insert(42, ()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove() {
        let map: ShardedMap<String, u64> = ShardedMap::new();

        map.insert("X".to_string(), 1);
        assert_eq!(map.remove(&"X".to_string()), Some(1));
        assert!(map.remove(&"X".to_string()).is_none());
        assert!(map.is_empty());
        assert!(!map.contains_key(&"X".to_string()));
    }

    #[test]
    fn test_get_or_insert_with_reuses_entry() {
        let map: ShardedMap<String, u64> = ShardedMap::new();

        assert_eq!(map.get_or_insert_with(&"X".to_string(), || 5), 5);
        // The factory must not run again for a present key.
        assert_eq!(map.get_or_insert_with(&"X".to_string(), || panic!()), 5);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_single_shard_still_works() {
        let map: ShardedMap<u64, u64> = ShardedMap::with_shards(1);
        for i in 0..100 {
            map.insert(i, i * 2);
        }
        assert_eq!(map.len(), 100);
        assert_eq!(map.get(&7), Some(14));
    }

    #[test]
    fn test_concurrent_get_or_insert_binds_one_value() {
        // Many threads racing to create the same absent key must all end up
        // holding the same Arc.
        let map: Arc<ShardedMap<String, Arc<u64>>> = Arc::new(ShardedMap::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let map = Arc::clone(&map);
                thread::spawn(move || map.get_or_insert_with(&"K".to_string(), || Arc::new(i)))
            })
            .collect();

        let values: Vec<Arc<u64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for v in &values[1..] {
            assert!(Arc::ptr_eq(&values[0], v));
        }
        assert_eq!(map.len(), 1);
    }
}
