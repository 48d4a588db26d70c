//! C1 — monotone, gap-free-enough identifier allocation.
//!
//! Two independent counters produce strictly increasing order/trade IDs
//! under concurrent callers. IDs are never reused within a process
//! lifetime; the spec does not require gap-freedom, only monotonicity, so
//! a plain atomic increment (no CAS retry loop) is sufficient.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique, monotonically increasing order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

/// Unique, monotonically increasing trade identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generator for order and trade IDs, shared across every symbol.
///
/// IDs start at 1 so that `0` can be reserved as a sentinel by callers
/// that need one (the engine itself never emits it).
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_order_id: AtomicU64,
    next_trade_id: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_order_id: AtomicU64::new(1),
            next_trade_id: AtomicU64::new(1),
        }
    }

    /// Allocate the next order ID. Lock-free, safe to call concurrently.
    pub fn next_order_id(&self) -> OrderId {
        OrderId(self.next_order_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate the next trade ID. Lock-free, safe to call concurrently.
    pub fn next_trade_id(&self) -> TradeId {
        TradeId(self.next_trade_id.fetch_add(1, Ordering::Relaxed))
    }
}
