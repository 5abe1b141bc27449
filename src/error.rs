//! Engine errors.
//!
//! Very little in the matching core is an error: cancelling an unknown order
//! is reported as a failed `OrderDeleted` event, and optimistic conflicts
//! are retried internally. The one rejection surfaced to the caller is
//! duplicate order-id admission.

use thiserror::Error;

/// Errors returned by [`OrderBook`](crate::OrderBook) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The order id was already used by some session during this engine's
    /// lifetime. Ids are never reused.
    #[error("duplicate order id: {0}")]
    DuplicateOrderId(u64),
}
