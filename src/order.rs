//! Order data model (spec §3).

use crate::decimal::Amount;
use crate::ids::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the book an order rests on or crosses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type: limit, market, or deferred stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Market,
    Limit,
    Stop,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Stop => write!(f, "STOP"),
        }
    }
}

/// Lifecycle status of an order (spec §3 invariants 2–4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Whether an order in this status can no longer be mutated by
    /// matching or cancellation (spec §4.6 cancellation path).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Partial => write!(f, "PARTIAL"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// An order at rest in the engine (spec §3).
///
/// `price` is required iff `kind == Limit` (it also doubles as the trigger
/// limit for a triggered `Stop` order); `stop_price` is required iff
/// `kind == Stop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: u64,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Amount,
    pub filled_quantity: Amount,
    pub price: Option<Amount>,
    pub stop_price: Option<Amount>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Remaining (unfilled) quantity.
    pub fn remaining(&self) -> Amount {
        self.quantity.saturating_sub(self.filled_quantity)
    }

    /// Whether this order currently rests on a book side (spec §3
    /// invariant 5 / GLOSSARY "Resting").
    pub fn is_resting(&self) -> bool {
        self.kind == OrderKind::Limit
            && matches!(self.status, OrderStatus::Pending | OrderStatus::Partial)
    }
}

/// A single executed trade (spec §3, immutable once appended).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: crate::ids::TradeId,
    pub symbol: String,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub quantity: Amount,
    pub price: Amount,
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_order(kind: OrderKind, qty: &str, filled: &str) -> Order {
        Order {
            id: OrderId(1),
            user_id: 1,
            symbol: "BTC/USD".into(),
            side: Side::Buy,
            kind,
            quantity: Amount::parse(qty).unwrap(),
            filled_quantity: Amount::parse(filled).unwrap(),
            price: Some(Amount::parse("100").unwrap()),
            stop_price: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn remaining_is_quantity_minus_filled() {
        let o = mk_order(OrderKind::Limit, "3", "1");
        assert_eq!(o.remaining(), Amount::parse("2").unwrap());
    }

    #[test]
    fn resting_requires_limit_and_open_status() {
        let mut o = mk_order(OrderKind::Limit, "3", "1");
        o.status = OrderStatus::Partial;
        assert!(o.is_resting());
        o.status = OrderStatus::Filled;
        assert!(!o.is_resting());

        let market = mk_order(OrderKind::Market, "3", "0");
        assert!(!market.is_resting());
    }

    #[test]
    fn side_opposite_round_trips() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Partial.is_terminal());
    }
}
