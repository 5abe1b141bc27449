//! Order book module.
//!
//! ## Components
//!
//! - [`PriorityKey`]: the comparison rule giving each side its matching
//!   order (price, then rest time, then id; buys rank price descending)
//! - [`BookSide`]: one (instrument, side)'s ordered storage with a version
//!   counter for optimistic re-validation
//! - [`OrderBook`]: the concurrent match-or-rest engine
//!
//! ## Concurrency
//!
//! Each side of each instrument sits behind its own mutex, handed out by a
//! sharded map so every caller sees the same lock. A per-(instrument, side)
//! phase lock serializes matching; resting an order revalidates a version
//! counter under both data locks. See [`book`] for the full protocol.

pub mod book;
pub mod side;

pub use book::OrderBook;
pub use side::{BookSide, PriorityKey};
