//! Core data types for shardbook.
//!
//! ## Types
//!
//! - [`Order`]: a limit order, incoming or resting
//! - [`Side`]: Buy or Sell
//! - [`Event`]: state changes emitted to the external sink
//!
//! Prices and quantities are plain integer ticks/lots; the engine assumes
//! the external command source has validated them.

mod event;
mod order;

pub use event::Event;
pub use order::{Order, Side};
