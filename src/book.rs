//! C5 — order book: the pair of book sides for one symbol, plus its
//! trade log (spec §4.5). Concurrency (the per-symbol RW lock) is layered
//! on top by [`crate::engine::MatchingEngine`]; this type itself assumes
//! exclusive access to whoever holds it.

use crate::book_side::BookSide;
use crate::decimal::Amount;
use crate::order::Side;
use crate::stop::PendingStops;
use crate::trade_log::TradeLog;

/// Bid/ask sides, the trade log, and armed stop orders for a single
/// symbol.
pub struct SymbolBook {
    pub symbol: String,
    pub bids: BookSide,
    pub asks: BookSide,
    pub trades: TradeLog,
    pub stops: PendingStops,
}

impl SymbolBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_trade_capacity(symbol, crate::trade_log::DEFAULT_CAPACITY)
    }

    pub fn with_trade_capacity(symbol: impl Into<String>, trade_capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            trades: TradeLog::new(trade_capacity),
            stops: PendingStops::new(),
        }
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Best bid < best ask at every quiescent point (spec §8 invariant 6).
    /// Used by tests, not by the hot path.
    pub fn is_crossed(&self) -> bool {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    pub fn best_bid(&self) -> Option<Amount> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Amount> {
        self.asks.best_price()
    }
}
