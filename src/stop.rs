//! STOP order bookkeeping: arming on admission and triggering on a
//! qualifying trade print (spec §4.6 "Stop orders").
//!
//! A STOP order never matches directly. It is held here until the last
//! trade price on its symbol crosses its `stop_price`, at which point it
//! is converted to a LIMIT (if it carries a `price`) or MARKET order and
//! handed back to the caller to run through [`crate::matching::run`].

use crate::ids::OrderId;
use crate::order::{Order, OrderKind, Side};
use crate::registry::OrderRegistry;
use crate::decimal::Amount;

/// Stop orders armed but not yet triggered, for one symbol.
#[derive(Debug, Default)]
pub struct PendingStops {
    armed: Vec<OrderId>,
}

impl PendingStops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a STOP order for later triggering. The order must already be
    /// stored in the registry with `kind == Stop`.
    pub fn arm(&mut self, id: OrderId) {
        self.armed.push(id);
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Remove a specific armed order (cancellation path), returning
    /// whether it was present.
    pub fn remove(&mut self, id: OrderId) -> bool {
        let before = self.armed.len();
        self.armed.retain(|armed| *armed != id);
        self.armed.len() != before
    }

    /// Remove and return every armed order whose trigger condition is met
    /// by `last_trade_price`, oldest admission first (spec §4.6: "stops
    /// triggered by the same print activate in the order they were
    /// admitted").
    ///
    /// BUY stops trigger when the price rises to meet or exceed their
    /// `stop_price`; SELL stops trigger when it falls to meet or undercut
    /// it.
    pub fn take_triggered(&mut self, registry: &OrderRegistry, last_trade_price: Amount) -> Vec<Order> {
        let mut triggered = Vec::new();
        self.armed.retain(|id| {
            let Some(order) = registry.get(*id) else {
                return false;
            };
            let stop_price = order
                .stop_price
                .expect("armed stop order without a stop_price");
            let hit = match order.side {
                Side::Buy => last_trade_price >= stop_price,
                Side::Sell => last_trade_price <= stop_price,
            };
            if hit {
                triggered.push(order);
                false
            } else {
                true
            }
        });
        triggered.sort_by_key(|o| o.created_at);
        triggered
    }
}

/// Convert a triggered STOP order into the LIMIT or MARKET order it now
/// behaves as, ready to be run through the matching algorithm.
pub fn activate(mut order: Order) -> Order {
    debug_assert_eq!(order.kind, OrderKind::Stop);
    order.kind = if order.price.is_some() {
        OrderKind::Limit
    } else {
        OrderKind::Market
    };
    order
}
