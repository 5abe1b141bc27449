//! Events emitted by the matching core.
//!
//! Formatting and emission of these events onto the wire is owned by the
//! external output layer; the engine only produces typed values through an
//! [`EventSink`](crate::sink::EventSink). All variants derive serde so that
//! layer can pick its own encoding without re-describing the payloads.
//!
//! Timestamps are monotonic nanosecond values from a steady clock (see
//! [`crate::time`]); they order events relative to each other and are never
//! calendar time.

use serde::{Deserialize, Serialize};

use crate::types::Side;

/// An event describing one state change in the order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An order rested in a book.
    OrderAdded {
        order_id: u64,
        instrument: String,
        price: u64,
        quantity: u64,
        side: Side,
        timestamp: u64,
    },

    /// An incoming order traded against a resting order.
    ///
    /// `fill_sequence` is the resting order's counter at the time of the
    /// trade; `price` is always the resting order's price.
    OrderExecuted {
        resting_order_id: u64,
        incoming_order_id: u64,
        fill_sequence: u64,
        price: u64,
        quantity: u64,
        timestamp: u64,
    },

    /// Outcome of a cancel request. `success` is false when the order was
    /// unknown to the session or already gone from the book (e.g. filled by
    /// a concurrent match).
    OrderDeleted {
        order_id: u64,
        success: bool,
        timestamp: u64,
    },
}

impl Event {
    /// The timestamp carried by this event.
    pub fn timestamp(&self) -> u64 {
        match self {
            Event::OrderAdded { timestamp, .. }
            | Event::OrderExecuted { timestamp, .. }
            | Event::OrderDeleted { timestamp, .. } => *timestamp,
        }
    }
}
