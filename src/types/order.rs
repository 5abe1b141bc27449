//! Order types for the shardbook matching core.
//!
//! ## Lifecycle
//!
//! An [`Order`] is created when a submit command arrives. It either matches
//! fully right away (and is never stored), matches partially and rests with a
//! reduced quantity, or rests unmatched with its full quantity. The
//! `rest_timestamp` is assigned exactly once, at the moment the order first
//! rests in a book — two orders at the same price rank by when they rested,
//! not by when they were submitted.
//!
//! ## Invariants
//!
//! - `remaining_quantity` only ever decreases and is never negative
//! - an order with `remaining_quantity == 0` is never stored in a book
//! - `fill_sequence` starts at 1 and is bumped each time the order survives
//!   being the resting side of a trade

use serde::{Deserialize, Serialize};

/// Order side: Buy or Sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid) - wants to purchase the instrument
    Buy,
    /// Sell order (ask) - wants to sell the instrument
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// A limit order, either incoming (being matched) or resting (stored in a
/// book awaiting a match).
///
/// Prices and quantities are integer ticks/lots; the crate performs no
/// validation on them (the external command source is assumed to have done
/// so).
///
/// ## Example
///
/// ```
/// use shardbook::{Order, Side};
///
/// let order = Order::new(1, "AAPL", Side::Buy, 100, 10);
/// assert_eq!(order.remaining_quantity, 10);
/// assert_eq!(order.fill_sequence, 1);
/// assert_eq!(order.rest_timestamp, 0); // not rested yet
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Order identifier, unique for the lifetime of the engine
    pub order_id: u64,

    /// Instrument key this order trades
    pub instrument: String,

    /// Limit price in integer ticks
    pub price: u64,

    /// Quantity still open; decremented as the order is matched
    pub remaining_quantity: u64,

    /// Buy or Sell
    pub side: Side,

    /// Per-order counter distinguishing successive partial fills against
    /// this order while it rests. Starts at 1.
    pub fill_sequence: u64,

    /// Monotonic nanosecond timestamp assigned once, when the order first
    /// rests in a book. 0 until then.
    pub rest_timestamp: u64,
}

impl Order {
    /// Create a new incoming order
    pub fn new(
        order_id: u64,
        instrument: impl Into<String>,
        side: Side,
        price: u64,
        quantity: u64,
    ) -> Self {
        Self {
            order_id,
            instrument: instrument.into(),
            price,
            remaining_quantity: quantity,
            side,
            fill_sequence: 1,
            rest_timestamp: 0,
        }
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Whether this incoming order crosses a resting order at `best_price`
    /// on the opposing side.
    ///
    /// A sell matches when its price is at or below the best buy price; a
    /// buy matches when its price is at or above the best sell price.
    pub fn crosses(&self, best_price: u64) -> bool {
        match self.side {
            Side::Sell => self.price <= best_price,
            Side::Buy => self.price >= best_price,
        }
    }

    /// Reduce the open quantity by `quantity`, saturating at zero.
    pub fn fill(&mut self, quantity: u64) {
        self.remaining_quantity = self.remaining_quantity.saturating_sub(quantity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_new() {
        let order = Order::new(7, "X", Side::Sell, 100, 25);

        assert_eq!(order.order_id, 7);
        assert_eq!(order.instrument, "X");
        assert_eq!(order.price, 100);
        assert_eq!(order.remaining_quantity, 25);
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.fill_sequence, 1);
        assert_eq!(order.rest_timestamp, 0);
        assert!(!order.is_filled());
    }

    #[test]
    fn test_order_fill() {
        let mut order = Order::new(1, "X", Side::Buy, 100, 10);

        order.fill(4);
        assert_eq!(order.remaining_quantity, 6);
        assert!(!order.is_filled());

        order.fill(6);
        assert_eq!(order.remaining_quantity, 0);
        assert!(order.is_filled());
    }

    #[test]
    fn test_order_fill_saturates() {
        let mut order = Order::new(1, "X", Side::Buy, 100, 10);
        order.fill(25);
        assert_eq!(order.remaining_quantity, 0);
    }

    #[test]
    fn test_sell_crosses_at_or_below_best_buy() {
        let sell = Order::new(1, "X", Side::Sell, 100, 1);
        assert!(sell.crosses(100));
        assert!(sell.crosses(101));
        assert!(!sell.crosses(99));
    }

    #[test]
    fn test_buy_crosses_at_or_above_best_sell() {
        let buy = Order::new(1, "X", Side::Buy, 100, 1);
        assert!(buy.crosses(100));
        assert!(buy.crosses(99));
        assert!(!buy.crosses(101));
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::from_str::<Side>("\"SELL\"").unwrap(), Side::Sell);
    }
}
