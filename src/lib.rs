//! # shardbook
//!
//! Concurrent multi-instrument limit order book with price-time priority
//! matching.
//!
//! ## Architecture
//!
//! - **Types**: [`Order`], [`Side`], [`Event`]
//! - **Sync**: [`ShardedMap`] (fixed-shard concurrent map with atomic
//!   get-or-create) and [`LockRegistry`] (one shared mutex per key)
//! - **OrderBook**: per-instrument/per-side books behind fine-grained locks,
//!   an optimistic check-then-commit rest path, and phase locks bounding
//!   matching to one in-flight matcher per (instrument, side)
//! - **Session**: [`SessionIndex`], the per-connection order index cancels
//!   resolve against
//! - **Sink**: [`EventSink`] implementations carrying events to the external
//!   output layer
//!
//! ## Design Principles
//!
//! 1. **No global lock**: unrelated instruments, and the two sides of one
//!    instrument, never contend
//! 2. **Price-time priority**: best price first, then earliest rest, then
//!    lowest id
//! 3. **Blocking mutual exclusion only**: no async, no lock timeouts
//! 4. **Integer ticks**: prices and quantities are plain integers, validated
//!    upstream
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use shardbook::{ChannelSink, Order, OrderBook, SessionIndex, Side};
//!
//! let (sink, events) = ChannelSink::unbounded();
//! let book = OrderBook::new(Arc::new(sink));
//! let mut session = SessionIndex::new();
//!
//! book.submit(Order::new(1, "AAPL", Side::Sell, 100, 10), &mut session)?;
//! book.submit(Order::new(2, "AAPL", Side::Buy, 100, 4), &mut session)?;
//!
//! // OrderAdded for id 1, then OrderExecuted 4 @ 100 against it.
//! assert_eq!(events.len(), 2);
//! # Ok::<(), shardbook::EngineError>(())
//! ```

pub mod error;
pub mod orderbook;
pub mod session;
pub mod sink;
pub mod sync;
pub mod time;
pub mod types;

pub use error::EngineError;
pub use orderbook::{BookSide, OrderBook, PriorityKey};
pub use session::SessionIndex;
pub use sink::{ChannelSink, EventSink, MemorySink, NullSink};
pub use sync::{LockHandle, LockRegistry, ShardedMap};
pub use types::{Event, Order, Side};
