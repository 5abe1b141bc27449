//! Concurrency primitives for the order book.
//!
//! ## Components
//!
//! - [`ShardedMap`]: generic concurrent map, fixed shards, one RwLock each,
//!   with atomic get-or-create
//! - [`LockRegistry`]: one shared mutex per key, identical handle for every
//!   caller
//!
//! The same sharded map serves three roles in the engine: storage for the
//! per-instrument book sides, lookup of phase-lock handles, and the global
//! order-id admission set.

pub mod registry;
pub mod shard_map;

pub use registry::{LockHandle, LockRegistry};
pub use shard_map::ShardedMap;
