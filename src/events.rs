//! C7 — event bus: per-symbol fan-out of order, book, and trade updates
//! (spec §4.7/§5/§6).
//!
//! Each symbol owns a `tokio::sync::broadcast` channel. `broadcast::Sender::send`
//! never awaits — it writes into a fixed-capacity ring and wakes
//! receivers — so matching can publish from inside the per-symbol lock
//! without a separate draining task. A receiver that falls behind gets
//! `RecvError::Lagged(n)` on its next `recv()`, which is exactly the
//! "oldest unsent event dropped, gap signaled" behavior spec §5 asks for;
//! there is no silent data loss to invent bookkeeping for.

use crate::decimal::Amount;
use crate::ids::OrderId;
use crate::order::{Order, OrderStatus, Side, Trade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Per-symbol bounded ring capacity. A lagging subscriber misses the
/// oldest events first; it is never blocked on or disconnected outright
/// (spec §5: "slow subscribers are dropped" means dropped *events*, the
/// broadcast channel signals the gap via `Lagged` rather than severing
/// the subscription).
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// `order_update` payload (spec §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdatePayload {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub status: OrderStatus,
    pub quantity: Amount,
    pub filled_quantity: Amount,
    pub price: Option<Amount>,
    pub timestamp: DateTime<Utc>,
}

impl From<&Order> for OrderUpdatePayload {
    fn from(o: &Order) -> Self {
        OrderUpdatePayload {
            order_id: o.id,
            symbol: o.symbol.clone(),
            side: o.side,
            status: o.status,
            quantity: o.quantity,
            filled_quantity: o.filled_quantity,
            price: o.price,
            timestamp: o.updated_at,
        }
    }
}

/// `order_book_update` payload: aggregate state of one touched level.
/// `order_count == 0` signals the level was deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookUpdatePayload {
    pub price: Amount,
    pub total_remaining_quantity: Amount,
    pub order_count: usize,
}

/// A single side's top-N levels, used in the snapshot payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelView {
    pub price: Amount,
    pub total_quantity: Amount,
    pub order_count: usize,
}

/// `order_book_snapshot` payload sent to a subscriber on join.
///
/// `seq` is the bus's sequence number *as of* this snapshot — the same
/// counter every subsequent `EventEnvelope` is stamped from, so a
/// consumer can tell whether the first live event it receives is the one
/// immediately following the snapshot or whether something was missed in
/// between (spec §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshotPayload {
    pub symbol: String,
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
    pub timestamp: DateTime<Utc>,
    pub seq: u64,
}

/// The event categories published on a symbol's stream (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    OrderBookSnapshot(BookSnapshotPayload),
    OrderUpdate(OrderUpdatePayload),
    OrderBookUpdate(BookUpdatePayload),
    Trade(Trade),
    Error(String),
    Pong,
}

/// The full envelope placed on the wire, carrying the per-symbol
/// monotone sequence number clients use to detect gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    pub payload: EventPayload,
    pub seq: u64,
}

/// Per-symbol publisher/subscription point.
pub struct SymbolBus {
    sender: broadcast::Sender<EventEnvelope>,
    seq: AtomicU64,
}

impl SymbolBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            seq: AtomicU64::new(0),
        }
    }

    /// Publish a payload, stamping it with the next sequence number for
    /// this symbol. Never blocks or suspends.
    pub fn publish(&self, payload: EventPayload) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        // A send error only means there are currently no subscribers;
        // that is not a failure condition for the publisher.
        let _ = self.sender.send(EventEnvelope { payload, seq });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn current_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }
}

impl Default for SymbolBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
