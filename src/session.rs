//! Per-connection session state.
//!
//! Each client session owns a [`SessionIndex`]: a map from order id to the
//! last known snapshot of an order that session rested. It exists to decide
//! whether a cancel is valid and to know which (instrument, side) book to
//! target; it is never shared between sessions, so it needs no lock. The
//! session loop passes it `&mut` into [`OrderBook::submit`] and
//! [`OrderBook::cancel`].
//!
//! The snapshot's `remaining_quantity` can be stale (concurrent fills do not
//! update it); only its identity fields — id, instrument, side, price,
//! rest_timestamp — are relied on, and those never change once rested.
//!
//! [`OrderBook::submit`]: crate::OrderBook::submit
//! [`OrderBook::cancel`]: crate::OrderBook::cancel

use std::collections::HashMap;

use crate::types::Order;

/// Order-id → snapshot map owned by one connection.
#[derive(Debug, Default)]
pub struct SessionIndex {
    orders: HashMap<u64, Order>,
}

impl SessionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot of an order this session rested.
    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.order_id, order);
    }

    /// Remove and return the snapshot for `order_id`.
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        self.orders.remove(&order_id)
    }

    /// Borrow the snapshot for `order_id`.
    pub fn get(&self, order_id: u64) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Whether this session is tracking `order_id`.
    pub fn contains(&self, order_id: u64) -> bool {
        self.orders.contains_key(&order_id)
    }

    /// Number of orders tracked.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the session tracks no orders.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    #[test]
    fn test_insert_remove() {
        let mut session = SessionIndex::new();
        assert!(session.is_empty());

        session.insert(Order::new(1, "X", Side::Buy, 100, 10));
        assert!(session.contains(1));
        assert_eq!(session.len(), 1);
        assert_eq!(session.get(1).unwrap().price, 100);

        let removed = session.remove(1).unwrap();
        assert_eq!(removed.order_id, 1);
        assert!(session.remove(1).is_none());
        assert!(session.is_empty());
    }
}
