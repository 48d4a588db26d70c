//! C8 — the public `MatchingEngine`: wires the registry, ID allocator,
//! per-symbol books, and per-symbol event buses together, and is the only
//! type application code outside this crate touches (spec §6).
//!
//! Per symbol, a [`std::sync::RwLock`] gives exclusive access to the
//! matching critical section while readers (book/trade queries) don't
//! block each other (spec §5, §9: replace the teacher's lock-free
//! skiplist design with a coarse per-symbol lock, since matching's
//! multi-step admission-then-cross-then-rest sequence isn't expressible
//! as a single lock-free compare-and-swap the way a single field update
//! is).
//!
//! Symbols are sharded across a [`DashMap`] so unrelated symbols never
//! contend with each other for the map itself, only within their own
//! lock.

use crate::book::SymbolBook;
use crate::decimal::Amount;
use crate::error::{EngineError, EngineResult};
use crate::events::{
    BookSnapshotPayload, EventEnvelope, EventPayload, LevelView, OrderUpdatePayload, SymbolBus,
    DEFAULT_CHANNEL_CAPACITY,
};
use crate::ids::{IdAllocator, OrderId};
use crate::matching;
use crate::order::{Order, OrderKind, OrderStatus, Side, Trade};
use crate::registry::OrderRegistry;
use crate::stop;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Tunable knobs for a [`MatchingEngine`] instance (spec §1.3).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-symbol trade log retention (spec §6: 10,000 by default).
    pub trade_log_capacity: usize,
    /// Per-symbol broadcast channel capacity (spec §5 bounded ring).
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trade_log_capacity: crate::trade_log::DEFAULT_CAPACITY,
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Request to submit a new order (spec §6 `submit_order`).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: u64,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Amount,
    pub price: Option<Amount>,
    pub stop_price: Option<Amount>,
}

/// The matching engine core: one process-wide instance holds every
/// symbol's book, the global order registry, and the event buses
/// consumers subscribe to.
pub struct MatchingEngine {
    config: EngineConfig,
    ids: IdAllocator,
    registry: OrderRegistry,
    books: DashMap<String, RwLock<SymbolBook>>,
    buses: DashMap<String, SymbolBus>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ids: IdAllocator::new(),
            registry: OrderRegistry::new(),
            books: DashMap::new(),
            buses: DashMap::new(),
        }
    }

    fn bus_for(&self, symbol: &str) -> dashmap::mapref::one::Ref<'_, String, SymbolBus> {
        if self.buses.get(symbol).is_none() {
            self.buses
                .entry(symbol.to_string())
                .or_insert_with(|| SymbolBus::new(self.config.event_channel_capacity));
        }
        self.buses.get(symbol).unwrap()
    }

    fn book_for(&self, symbol: &str) -> dashmap::mapref::one::Ref<'_, String, RwLock<SymbolBook>> {
        if self.books.get(symbol).is_none() {
            self.books.entry(symbol.to_string()).or_insert_with(|| {
                RwLock::new(SymbolBook::with_trade_capacity(symbol, self.config.trade_log_capacity))
            });
        }
        self.books.get(symbol).unwrap()
    }

    /// Validate admission inputs (spec §4.6 "Admission validation"). A
    /// failure here never returns `Err`: the order is stored with
    /// `REJECTED` status and handed back to the caller, since a rejection
    /// is itself a normal lifecycle outcome, not a request failure — the
    /// distinction the `Err` variants in [`EngineError`] exist for is
    /// "this call didn't happen", which admission always does.
    fn validate(new_order: &NewOrder) -> Result<(), String> {
        if !new_order.quantity.is_positive() {
            return Err("quantity must be positive".into());
        }
        match new_order.kind {
            OrderKind::Limit if new_order.price.is_none() => {
                Err("LIMIT order requires a price".into())
            }
            OrderKind::Stop if new_order.stop_price.is_none() => {
                Err("STOP order requires a stop_price".into())
            }
            _ => Ok(()),
        }
    }

    /// Submit a new order (spec §6 `submit_order`, §4.6 full admission
    /// and matching sequence).
    pub fn submit(&self, new_order: NewOrder) -> Order {
        let id = self.ids.next_order_id();
        let now = Utc::now();
        let mut order = Order {
            id,
            user_id: new_order.user_id,
            symbol: new_order.symbol.clone(),
            side: new_order.side,
            kind: new_order.kind,
            quantity: new_order.quantity,
            filled_quantity: Amount::ZERO,
            price: new_order.price,
            stop_price: new_order.stop_price,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        if let Err(reason) = Self::validate(&new_order) {
            warn!(order_id = %id, %reason, "order rejected at admission");
            order.status = OrderStatus::Rejected;
            self.registry.put(order.clone());
            return order;
        }

        let book_ref = self.book_for(&order.symbol);
        let bus_ref = self.bus_for(&order.symbol);

        if order.kind == OrderKind::Stop {
            let mut book = book_ref.write().unwrap();
            self.registry.put(order.clone());
            book.stops.arm(order.id);
            info!(order_id = %id, symbol = %order.symbol, "stop order armed");
            return order;
        }

        let mut book = book_ref.write().unwrap();
        let result = self.run_and_cascade(&mut book, &bus_ref, order);
        result
    }

    /// Run `incoming` through the matching algorithm, then check every
    /// trade it printed — not just the sweep's final price — against the
    /// armed stop orders, since spec §4.6 triggers a stop "when a trade
    /// on `symbol` prints at a price that crosses `stop_price`" for *any*
    /// print, not only the last one a multi-level sweep happens to leave
    /// behind. Each triggered order's own prints are queued for the same
    /// check in turn, so a cascade of stops triggering further stops is
    /// still resolved in the order the prints actually occurred.
    fn run_and_cascade(&self, book: &mut SymbolBook, bus: &SymbolBus, incoming: Order) -> Order {
        let outcome = matching::run(book, &self.registry, &self.ids, bus, incoming);
        let submitted = outcome.order.clone();

        let mut pending_prices: VecDeque<Amount> =
            outcome.trades.iter().map(|t| t.price).collect();

        while let Some(price) = pending_prices.pop_front() {
            if book.stops.is_empty() {
                continue;
            }
            for stop_order in book.stops.take_triggered(&self.registry, price) {
                let activated = stop::activate(stop_order);
                info!(order_id = %activated.id, "stop order triggered");
                let cascade = matching::run(book, &self.registry, &self.ids, bus, activated);
                pending_prices.extend(cascade.trades.iter().map(|t| t.price));
            }
        }

        submitted
    }

    /// Cancel a resting order (spec §6 `cancel_order`).
    pub fn cancel(&self, user_id: u64, order_id: OrderId) -> EngineResult<Order> {
        let order = self.registry.get(order_id).ok_or(EngineError::NotFound(order_id))?;
        if order.user_id != user_id {
            return Err(EngineError::Forbidden(order_id));
        }
        if order.status.is_terminal() {
            return Err(EngineError::IllegalState {
                order: order_id,
                status: order.status,
            });
        }

        let book_ref = self.book_for(&order.symbol);
        let bus_ref = self.bus_for(&order.symbol);
        let mut book = book_ref.write().unwrap();

        if order.kind == OrderKind::Stop {
            book.stops.remove(order_id);
        } else if order.is_resting() {
            let price = order.price.expect("resting order without a price");
            let side = book.side_mut(order.side);
            if let Some(level) = side.level_mut(price) {
                level.remove(order_id);
                if level.is_empty() {
                    side.erase(price);
                }
            }
        }

        let cancelled = self
            .registry
            .mutate(order_id, |o| {
                o.status = OrderStatus::Cancelled;
                o.updated_at = Utc::now();
            })
            .expect("order vanished from registry during cancel");

        bus_ref.publish(EventPayload::OrderUpdate(OrderUpdatePayload::from(&cancelled)));
        Ok(cancelled)
    }

    /// Look up a single order, enforcing ownership (spec §6 `get_order`).
    pub fn lookup(&self, user_id: u64, order_id: OrderId) -> EngineResult<Order> {
        let order = self.registry.get(order_id).ok_or(EngineError::NotFound(order_id))?;
        if order.user_id != user_id {
            return Err(EngineError::Forbidden(order_id));
        }
        Ok(order)
    }

    /// List a user's orders, optionally filtered by status (spec §6
    /// `list_user_orders`, §4.8).
    pub fn list(&self, user_id: u64, status: Option<OrderStatus>) -> Vec<Order> {
        self.registry.list_by_user(user_id, status)
    }

    /// Snapshot the order book for `symbol` to `depth` levels per side,
    /// clamped to `[1, 100]` (spec §4.8 `get_order_book`).
    pub fn book(&self, symbol: &str, depth: usize) -> BookSnapshotPayload {
        let depth = depth.clamp(1, 100);
        let bus_ref = self.bus_for(symbol);
        let book_ref = self.book_for(symbol);
        let book = book_ref.read().unwrap();
        to_snapshot(&book, depth, bus_ref.current_seq())
    }

    /// Most recent trades for `symbol`, newest first, clamped to
    /// `[1, 1000]` (spec §4.8 `get_recent_trades`).
    pub fn trades(&self, symbol: &str, limit: usize) -> Vec<Trade> {
        let limit = limit.clamp(1, 1000);
        let book_ref = self.book_for(symbol);
        let book = book_ref.read().unwrap();
        book.trades.recent(limit)
    }

    /// Subscribe to `symbol`'s event stream. The first event the
    /// subscriber sees after this call is always a fresh
    /// `order_book_snapshot` (spec §4.7 "a new subscriber's first message
    /// is a snapshot"), stamped with the bus's current sequence number so
    /// the consumer can tell whether anything landed between the
    /// snapshot and its subscription taking effect.
    pub fn subscribe(&self, symbol: &str) -> (BookSnapshotPayload, broadcast::Receiver<EventEnvelope>) {
        let bus_ref = self.bus_for(symbol);
        let book_ref = self.book_for(symbol);
        // Subscribe while still holding the book's read lock: matching
        // only publishes under the write lock, so the snapshot's
        // contents, the seq read here, and the receiver's starting point
        // are all taken from the same consistent instant.
        let book = book_ref.read().unwrap();
        let rx = bus_ref.subscribe();
        let snapshot = to_snapshot(&book, 100, bus_ref.current_seq());
        (snapshot, rx)
    }

    /// Liveness check; the engine has no external dependencies to probe,
    /// so this always succeeds once the process is up (spec §2).
    pub fn health(&self) -> bool {
        true
    }
}

fn to_snapshot(book: &SymbolBook, depth: usize, seq: u64) -> BookSnapshotPayload {
    let to_view = |(price, qty, count): (Amount, Amount, usize)| LevelView {
        price,
        total_quantity: qty,
        order_count: count,
    };
    BookSnapshotPayload {
        symbol: book.symbol.clone(),
        bids: book.bids.top_n(depth).into_iter().map(to_view).collect(),
        asks: book.asks.top_n(depth).into_iter().map(to_view).collect(),
        timestamp: Utc::now(),
        seq,
    }
}
