//! One side of one instrument's book: priority ordering plus versioned
//! storage.
//!
//! ## Priority ordering
//!
//! A side stores its resting orders in a `BTreeMap` keyed by
//! [`PriorityKey`], so the map's first entry is always the best order to
//! match next:
//!
//! - **Sell side**: ascending (price, rest_timestamp, order_id) — lowest ask
//!   first
//! - **Buy side**: descending price, then ascending (rest_timestamp,
//!   order_id) — highest bid first
//!
//! Buys rank by the bitwise complement of the price, so one key type serves
//! both sides with a single derived ordering. Quantity is not part of the
//! key: a partial fill changes an order's quantity but never its position.
//!
//! ## Version counter
//!
//! Every mutation bumps `version`. The submit path peeks a side under its
//! lock, releases it, re-acquires locks, and compares versions: an unchanged
//! version proves nothing was rested, matched, or cancelled in between. This
//! replaces re-checking the peeked order's id/quantity, which could false-
//! positive if an identical-looking order reappeared.

use std::collections::BTreeMap;

use crate::types::{Order, Side};

/// Sort key giving a book side its matching order.
///
/// Storage equality is by order id in the sense that keys embed the id and
/// at most one entry per id exists per side (ids are globally unique at
/// admission).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    price_rank: u64,
    rest_timestamp: u64,
    order_id: u64,
}

impl PriorityKey {
    /// Key for an order resting on `side` at `price`.
    pub fn new(side: Side, price: u64, rest_timestamp: u64, order_id: u64) -> Self {
        let price_rank = match side {
            Side::Sell => price,
            // Complemented so the highest bid sorts first.
            Side::Buy => !price,
        };
        Self {
            price_rank,
            rest_timestamp,
            order_id,
        }
    }

    /// Key under which `order` is (or would be) stored on its own side.
    pub fn for_order(order: &Order) -> Self {
        Self::new(
            order.side,
            order.price,
            order.rest_timestamp,
            order.order_id,
        )
    }
}

/// Ordered storage for one (instrument, side), with a version counter for
/// optimistic re-validation. Not internally synchronized: the book wraps
/// each side in its own `Mutex`.
#[derive(Debug)]
pub struct BookSide {
    side: Side,
    orders: BTreeMap<PriorityKey, Order>,
    version: u64,
}

impl BookSide {
    /// Create an empty side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            orders: BTreeMap::new(),
            version: 0,
        }
    }

    /// Which side this is.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Current version; bumped by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether no orders rest on this side.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of resting orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// The order that matches next, if any.
    pub fn peek_best(&self) -> Option<&Order> {
        self.orders.values().next()
    }

    /// Remove and return the order that matches next.
    pub fn pop_best(&mut self) -> Option<Order> {
        let (_, order) = self.orders.pop_first()?;
        self.version += 1;
        Some(order)
    }

    /// Store a resting order. The caller must have assigned
    /// `rest_timestamp` already; the key is derived from it.
    pub fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.side, self.side);
        debug_assert!(order.remaining_quantity > 0);
        self.orders.insert(PriorityKey::for_order(&order), order);
        self.version += 1;
    }

    /// Erase the entry stored under `snapshot`'s key. Returns whether an
    /// entry was found; a miss means the order was already consumed or
    /// cancelled.
    pub fn remove(&mut self, snapshot: &Order) -> bool {
        let removed = self
            .orders
            .remove(&PriorityKey::for_order(snapshot))
            .is_some();
        if removed {
            self.version += 1;
        }
        removed
    }

    /// Resting orders in matching order (best first). Test/diagnostic use.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rested(id: u64, side: Side, price: u64, quantity: u64, ts: u64) -> Order {
        let mut order = Order::new(id, "X", side, price, quantity);
        order.rest_timestamp = ts;
        order
    }

    #[test]
    fn test_sell_side_lowest_price_first() {
        let mut side = BookSide::new(Side::Sell);
        side.insert(rested(1, Side::Sell, 105, 1, 10));
        side.insert(rested(2, Side::Sell, 101, 1, 20));
        side.insert(rested(3, Side::Sell, 103, 1, 30));

        assert_eq!(side.peek_best().unwrap().order_id, 2);
        let prices: Vec<u64> = side.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![101, 103, 105]);
    }

    #[test]
    fn test_buy_side_highest_price_first() {
        let mut side = BookSide::new(Side::Buy);
        side.insert(rested(1, Side::Buy, 99, 1, 10));
        side.insert(rested(2, Side::Buy, 103, 1, 20));
        side.insert(rested(3, Side::Buy, 101, 1, 30));

        assert_eq!(side.peek_best().unwrap().order_id, 2);
        let prices: Vec<u64> = side.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![103, 101, 99]);
    }

    #[test]
    fn test_same_price_ranks_by_rest_timestamp() {
        let mut side = BookSide::new(Side::Buy);
        side.insert(rested(1, Side::Buy, 100, 1, 30));
        side.insert(rested(2, Side::Buy, 100, 1, 10));
        side.insert(rested(3, Side::Buy, 100, 1, 20));

        let ids: Vec<u64> = side.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_same_price_same_timestamp_ranks_by_id() {
        let mut side = BookSide::new(Side::Sell);
        side.insert(rested(9, Side::Sell, 100, 1, 5));
        side.insert(rested(4, Side::Sell, 100, 1, 5));

        let ids: Vec<u64> = side.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn test_pop_best_drains_in_priority_order() {
        let mut side = BookSide::new(Side::Sell);
        side.insert(rested(1, Side::Sell, 102, 1, 1));
        side.insert(rested(2, Side::Sell, 101, 1, 2));

        assert_eq!(side.pop_best().unwrap().order_id, 2);
        assert_eq!(side.pop_best().unwrap().order_id, 1);
        assert!(side.pop_best().is_none());
        assert!(side.is_empty());
    }

    #[test]
    fn test_remove_by_snapshot() {
        let mut side = BookSide::new(Side::Buy);
        let order = rested(5, Side::Buy, 100, 3, 7);
        side.insert(order.clone());

        assert!(side.remove(&order));
        assert!(!side.remove(&order));
        assert!(side.is_empty());
    }

    #[test]
    fn test_version_bumps_on_mutation_only() {
        let mut side = BookSide::new(Side::Sell);
        let v0 = side.version();

        side.insert(rested(1, Side::Sell, 100, 1, 1));
        let v1 = side.version();
        assert!(v1 > v0);

        // Peeks do not bump.
        let _ = side.peek_best();
        assert_eq!(side.version(), v1);

        side.pop_best();
        assert!(side.version() > v1);

        // A failed remove is not a mutation.
        let v2 = side.version();
        assert!(!side.remove(&rested(99, Side::Sell, 100, 1, 1)));
        assert_eq!(side.version(), v2);
    }

    #[test]
    fn test_quantity_not_part_of_key() {
        let mut side = BookSide::new(Side::Sell);
        let mut order = rested(1, Side::Sell, 100, 10, 1);
        side.insert(order.clone());

        // Re-inserting with a different quantity lands on the same key.
        side.pop_best();
        order.fill(4);
        side.insert(order);
        assert_eq!(side.len(), 1);
        assert_eq!(side.peek_best().unwrap().remaining_quantity, 6);
    }
}
