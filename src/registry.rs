//! C2 — order registry: canonical store of every order, with
//! per-user and per-symbol membership indices (spec §4.2).
//!
//! Sharded via `dashmap`, the same structure the teacher crate uses for
//! its `order_locations`/`user_orders` maps, so per-order reads and
//! per-user listings don't serialize behind a single global lock the way
//! the spec's "separate registry-wide RW lock" wording would if taken
//! literally with a plain `RwLock<HashMap<..>>`.

use crate::ids::OrderId;
use crate::order::{Order, OrderStatus};
use dashmap::DashMap;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: DashMap<OrderId, Order>,
    by_user: DashMap<u64, HashSet<OrderId>>,
    by_symbol: DashMap<String, HashSet<OrderId>>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an order by ID, updating the secondary indices in the same
    /// logical step. Idempotent: re-`put`ting the same ID just replaces
    /// the stored record and leaves the indices unchanged.
    pub fn put(&self, order: Order) {
        self.by_user
            .entry(order.user_id)
            .or_default()
            .insert(order.id);
        self.by_symbol
            .entry(order.symbol.clone())
            .or_default()
            .insert(order.id);
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).map(|entry| entry.clone())
    }

    /// Apply a fill/status mutation to a stored order under an exclusive
    /// lock on that single entry (`dashmap`'s per-shard locking), without
    /// taking a registry-wide lock.
    pub fn mutate<F>(&self, id: OrderId, f: F) -> Option<Order>
    where
        F: FnOnce(&mut Order),
    {
        let mut entry = self.orders.get_mut(&id)?;
        f(&mut entry);
        Some(entry.clone())
    }

    /// Orders for `user_id`, newest first, optionally filtered by status.
    pub fn list_by_user(&self, user_id: u64, status: Option<OrderStatus>) -> Vec<Order> {
        let Some(ids) = self.by_user.get(&user_id) else {
            return Vec::new();
        };
        let mut orders: Vec<Order> = ids
            .iter()
            .filter_map(|id| self.orders.get(id).map(|e| e.clone()))
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    #[allow(dead_code)]
    pub fn symbol_order_count(&self, symbol: &str) -> usize {
        self.by_symbol.get(symbol).map(|s| s.len()).unwrap_or(0)
    }
}
