//! Event sink boundary.
//!
//! The engine reports every book change as an [`Event`] pushed into an
//! [`EventSink`]. Formatting and delivery to clients belong to the external
//! output layer; the sink implementations here only move values:
//!
//! - [`ChannelSink`]: hands events to a crossbeam channel for an out-of-band
//!   consumer
//! - [`MemorySink`]: buffers events in memory (tests, diagnostics)
//! - [`NullSink`]: discards everything (benchmarks)
//!
//! Emission must never block or fail the matching path: `ChannelSink` logs
//! and drops events once the receiver is gone.

use parking_lot::Mutex;
use tracing::warn;

use crate::types::Event;

/// Consumer of engine events. Implementations must be cheap and non-blocking;
/// `emit` is called while book locks are held.
pub trait EventSink: Send + Sync {
    /// Accept one event.
    fn emit(&self, event: Event);
}

/// Sink that forwards events into a crossbeam channel.
///
/// ## Example
///
/// ```
/// use shardbook::{ChannelSink, EventSink, Event};
///
/// let (sink, rx) = ChannelSink::unbounded();
/// sink.emit(Event::OrderDeleted { order_id: 1, success: false, timestamp: 0 });
/// assert!(rx.recv().is_ok());
/// ```
pub struct ChannelSink {
    tx: crossbeam_channel::Sender<Event>,
}

impl ChannelSink {
    /// Create a sink backed by an unbounded channel, returning the receiver
    /// for the consuming side.
    pub fn unbounded() -> (Self, crossbeam_channel::Receiver<Event>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    pub fn new(tx: crossbeam_channel::Sender<Event>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        if self.tx.send(event).is_err() {
            warn!("event receiver disconnected; dropping event");
        }
    }
}

/// Sink that appends events to an in-memory buffer.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out all events recorded so far.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Drain and return all recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}
