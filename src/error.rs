//! Engine error kinds (spec §7).

use crate::ids::OrderId;
use thiserror::Error;

/// Errors surfaced by the matching engine core.
///
/// `Validation`/`NotFound`/`Forbidden`/`IllegalState` are ordinary returned
/// errors — no book state changes when they fire. `Unavailable` is soft:
/// it means a subscriber was dropped for lagging, not that the operation
/// that triggered publication failed. `Internal` is never returned by
/// normal control flow; invariant breaches panic directly (spec §7), it
/// exists only so callers have a named variant to match on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Bad input at admission: non-positive quantity, LIMIT without price,
    /// STOP without stop_price, or an unknown side/kind.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Order ID unknown to the registry.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// Order ID exists but belongs to another user.
    #[error("order {0} does not belong to the requesting user")]
    Forbidden(OrderId),

    /// Cancel/modify attempted on a terminal order.
    #[error("order {order} cannot be modified, status is already {status}")]
    IllegalState {
        order: OrderId,
        status: crate::order::OrderStatus,
    },

    /// Event bus ring overflow for a subscriber; the subscriber was
    /// dropped, not the operation that published the event.
    #[error("event bus unavailable for symbol {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },

    /// Invariant breach. Should be unreachable — book state is untrusted
    /// thereafter if this is ever observed.
    #[error("internal invariant breach: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
