//! Per-key lock registry.
//!
//! Hands out one shared mutex per string key, created lazily on first
//! request. The central invariant: every caller asking for the lock of the
//! same key receives the *identical* `Arc` — two different handles for one
//! key would silently break mutual exclusion. [`ShardedMap`]'s atomic
//! get-or-create guarantees this by construction.
//!
//! The order book keeps two registries per engine: the buy-side and
//! sell-side matching phase locks (one lock per instrument each).

use std::sync::Arc;

use parking_lot::Mutex;

use crate::sync::ShardedMap;

/// A shared, reusable lock handle.
pub type LockHandle = Arc<Mutex<()>>;

/// Lazily populated registry of one mutex per key.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use shardbook::LockRegistry;
///
/// let registry = LockRegistry::new();
/// let a = registry.handle("AAPL");
/// let b = registry.handle("AAPL");
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: ShardedMap<String, LockHandle>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            locks: ShardedMap::new(),
        }
    }

    /// The shared lock for `key`, creating it on first request.
    pub fn handle(&self, key: &str) -> LockHandle {
        // Allocates the lookup key only; the handle itself is created once.
        let key = key.to_string();
        self.locks
            .get_or_insert_with(&key, || Arc::new(Mutex::new(())))
    }

    /// Number of distinct keys with a lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock has been handed out yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
