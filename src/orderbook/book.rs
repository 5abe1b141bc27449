//! The concurrent order book: match-or-rest submission and cancellation.
//!
//! ## Locking protocol
//!
//! Per instrument there are two data locks (one per side, each guarding that
//! side's [`BookSide`]) and two phase locks (one per side, from a
//! [`LockRegistry`]). A submit:
//!
//! 1. Holds the *opposing* side's phase lock for the whole call. This bounds
//!    matching against one (instrument, side) to a single in-flight matcher,
//!    while unrelated instruments — and the two sides of one instrument —
//!    proceed fully in parallel.
//! 2. Peeks the opposing book under its data lock. A crossing best order is
//!    consumed under that same lock, so peek and trade observe one
//!    consistent state.
//! 3. If there is nothing to take, the rest path releases the peek lock,
//!    acquires *both* data locks through one fixed-order helper (buy side
//!    first, always), and re-validates the opposing side's version counter.
//!    A changed version means a concurrent writer got in between: retry the
//!    loop. Unchanged means "the book is still not matchable" and "rest my
//!    own order" commit atomically with respect to concurrent inserts.
//!
//! Retries happen only after a genuine version change, so every retry
//! implies another thread completed a mutation (forward progress).
//!
//! ## Order-id admission
//!
//! Order ids are unique for the engine's lifetime: `submit` registers the id
//! in a sharded set up front and rejects duplicates. The book's tie-break
//! and cancel-by-id logic rely on this.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::orderbook::side::BookSide;
use crate::session::SessionIndex;
use crate::sink::EventSink;
use crate::sync::{LockRegistry, ShardedMap};
use crate::time;
use crate::types::{Event, Order, Side};

/// One side's storage together with its data lock. Identical handle for
/// every caller of the same (instrument, side).
type SharedSide = Arc<Mutex<BookSide>>;

/// Multi-instrument concurrent limit order book.
///
/// All synchronization is internal; `&self` methods are safe to call from
/// many session threads at once. Each call takes the caller's own
/// [`SessionIndex`] because cancellation is resolved against session-local
/// state, never a global index.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use shardbook::{MemorySink, Order, OrderBook, SessionIndex, Side};
///
/// let sink = Arc::new(MemorySink::new());
/// let book = OrderBook::new(sink.clone());
/// let mut session = SessionIndex::new();
///
/// book.submit(Order::new(1, "AAPL", Side::Sell, 100, 10), &mut session).unwrap();
/// book.submit(Order::new(2, "AAPL", Side::Buy, 100, 4), &mut session).unwrap();
///
/// // One add, one execution of 4 @ 100.
/// assert_eq!(sink.len(), 2);
/// ```
pub struct OrderBook {
    buy_books: ShardedMap<String, SharedSide>,
    sell_books: ShardedMap<String, SharedSide>,
    buy_phase: LockRegistry,
    sell_phase: LockRegistry,
    admitted_ids: ShardedMap<u64, ()>,
    sink: Arc<dyn EventSink>,
}

impl OrderBook {
    /// Create an empty book emitting into `sink`.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            buy_books: ShardedMap::new(),
            sell_books: ShardedMap::new(),
            buy_phase: LockRegistry::new(),
            sell_phase: LockRegistry::new(),
            admitted_ids: ShardedMap::new(),
            sink,
        }
    }

    /// Submit an incoming order: match it against the opposing side while it
    /// crosses, then rest any remainder in its own side's book.
    ///
    /// Emits `OrderExecuted` per trade and `OrderAdded` if the order rests.
    /// Returns an error only when the order id was already used.
    pub fn submit(&self, mut order: Order, session: &mut SessionIndex) -> Result<(), EngineError> {
        if !self.admitted_ids.try_insert(order.order_id, ()) {
            debug!(order_id = order.order_id, "rejected duplicate order id");
            return Err(EngineError::DuplicateOrderId(order.order_id));
        }

        let buy = self.side_handle(&order.instrument, Side::Buy);
        let sell = self.side_handle(&order.instrument, Side::Sell);
        let opposing = match order.side {
            Side::Buy => &sell,
            Side::Sell => &buy,
        };

        // One in-flight matcher per (instrument, matched side), for the
        // whole call.
        let phase = match order.side {
            Side::Buy => self.sell_phase.handle(&order.instrument),
            Side::Sell => self.buy_phase.handle(&order.instrument),
        };
        let _phase = phase.lock();

        while !order.is_filled() {
            let mut opp = opposing.lock();
            let crossing = opp
                .peek_best()
                .map(|best| order.crosses(best.price))
                .unwrap_or(false);

            if !crossing {
                // Nothing to take right now. Commit the rest only if the
                // opposing side is provably unchanged under both locks.
                let observed = opp.version();
                drop(opp);

                let (buy_guard, sell_guard) = Self::lock_both(&buy, &sell);
                let (mut own, opp_check) = match order.side {
                    Side::Buy => (buy_guard, sell_guard),
                    Side::Sell => (sell_guard, buy_guard),
                };
                if opp_check.version() != observed {
                    trace!(
                        order_id = order.order_id,
                        "opposing side mutated before rest, retrying"
                    );
                    continue;
                }
                self.rest(&mut own, order, session);
                return Ok(());
            }

            // The peek and the trade happen under one continuous lock, so
            // the best order cannot change in between.
            let Some(mut resting) = opp.pop_best() else {
                continue;
            };
            let trade_quantity = order.remaining_quantity.min(resting.remaining_quantity);

            self.sink.emit(Event::OrderExecuted {
                resting_order_id: resting.order_id,
                incoming_order_id: order.order_id,
                fill_sequence: resting.fill_sequence,
                price: resting.price,
                quantity: trade_quantity,
                timestamp: time::monotonic_nanos(),
            });
            debug!(
                resting = resting.order_id,
                incoming = order.order_id,
                price = resting.price,
                quantity = trade_quantity,
                "executed"
            );

            order.fill(trade_quantity);
            resting.fill(trade_quantity);

            if resting.is_filled() {
                // Gone from the book; if this session rested it, forget it.
                session.remove(resting.order_id);
            } else {
                // Future fills against it get a new sequence number. The key
                // (price, rest_timestamp, id) is unchanged, so it keeps its
                // queue position.
                resting.fill_sequence += 1;
                opp.insert(resting);
            }
        }

        Ok(())
    }

    /// Cancel an order by id, resolved against the caller's session index
    /// only. Always emits exactly one `OrderDeleted`; `success` is false for
    /// ids this session never rested and for orders already gone from the
    /// book (e.g. filled by a concurrent match).
    pub fn cancel(&self, order_id: u64, session: &mut SessionIndex) {
        let Some(snapshot) = session.remove(order_id) else {
            debug!(order_id, "cancel for order not tracked by session");
            self.sink.emit(Event::OrderDeleted {
                order_id,
                success: false,
                timestamp: time::monotonic_nanos(),
            });
            return;
        };

        let book = self.side_handle(&snapshot.instrument, snapshot.side);
        let mut guard = book.lock();
        let success = guard.remove(&snapshot);
        self.sink.emit(Event::OrderDeleted {
            order_id,
            success,
            timestamp: time::monotonic_nanos(),
        });
        drop(guard);

        debug!(order_id, success, "cancel");
    }

    /// Number of orders resting on one side of one instrument.
    pub fn depth(&self, instrument: &str, side: Side) -> usize {
        match self.books(side).get(&instrument.to_string()) {
            Some(book) => book.lock().len(),
            None => 0,
        }
    }

    /// Price of the order that would match next on `side`, if any.
    pub fn best_price(&self, instrument: &str, side: Side) -> Option<u64> {
        let book = self.books(side).get(&instrument.to_string())?;
        let guard = book.lock();
        guard.peek_best().map(|o| o.price)
    }

    fn books(&self, side: Side) -> &ShardedMap<String, SharedSide> {
        match side {
            Side::Buy => &self.buy_books,
            Side::Sell => &self.sell_books,
        }
    }

    fn side_handle(&self, instrument: &str, side: Side) -> SharedSide {
        let key = instrument.to_string();
        self.books(side)
            .get_or_insert_with(&key, || Arc::new(Mutex::new(BookSide::new(side))))
    }

    /// Both data locks for one instrument. Always buy side first — every
    /// two-lock acquisition in the engine goes through here, so lock order
    /// can never invert.
    fn lock_both<'a>(
        buy: &'a SharedSide,
        sell: &'a SharedSide,
    ) -> (MutexGuard<'a, BookSide>, MutexGuard<'a, BookSide>) {
        let buy_guard = buy.lock();
        let sell_guard = sell.lock();
        (buy_guard, sell_guard)
    }

    /// Rest `order` in its own side's book. Assigns the rest timestamp here
    /// — price-time priority ranks by when an order rested, not when it was
    /// submitted. Caller holds both data locks.
    fn rest(&self, book: &mut BookSide, mut order: Order, session: &mut SessionIndex) {
        let timestamp = time::monotonic_nanos();
        order.rest_timestamp = timestamp;

        self.sink.emit(Event::OrderAdded {
            order_id: order.order_id,
            instrument: order.instrument.clone(),
            price: order.price,
            quantity: order.remaining_quantity,
            side: order.side,
            timestamp,
        });
        debug!(
            order_id = order.order_id,
            instrument = %order.instrument,
            price = order.price,
            quantity = order.remaining_quantity,
            "order rests"
        );

        session.insert(order.clone());
        book.insert(order);
    }
}
