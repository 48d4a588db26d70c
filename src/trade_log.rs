//! Bounded, append-only trade log kept by each symbol's order book
//! (spec §5/§6: "bounded ring of the most recent 10,000 trades per
//! symbol (trim older)").

use crate::order::Trade;
use std::collections::VecDeque;

/// Default retention depth per symbol, per spec §6.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug)]
pub struct TradeLog {
    capacity: usize,
    trades: VecDeque<Trade>,
}

impl TradeLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            trades: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Append a trade, trimming the oldest entry if at capacity.
    pub fn append(&mut self, trade: Trade) {
        if self.trades.len() == self.capacity {
            self.trades.pop_front();
        }
        self.trades.push_back(trade);
    }

    /// Up to `limit` most recent trades, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Trade> {
        self.trades.iter().rev().take(limit).cloned().collect()
    }
}

impl Default for TradeLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Amount;
    use crate::ids::{OrderId, TradeId};
    use chrono::Utc;

    fn trade(id: u64) -> Trade {
        Trade {
            id: TradeId(id),
            symbol: "BTC/USD".into(),
            buy_order_id: OrderId(1),
            sell_order_id: OrderId(2),
            quantity: Amount::parse("1").unwrap(),
            price: Amount::parse("100").unwrap(),
            executed_at: Utc::now(),
        }
    }

    #[test]
    fn recent_returns_newest_first() {
        let mut log = TradeLog::new(10);
        log.append(trade(1));
        log.append(trade(2));
        log.append(trade(3));
        let recent = log.recent(2);
        assert_eq!(recent.iter().map(|t| t.id.0).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn trims_oldest_beyond_capacity() {
        let mut log = TradeLog::new(2);
        log.append(trade(1));
        log.append(trade(2));
        log.append(trade(3));
        let all = log.recent(10);
        assert_eq!(all.iter().map(|t| t.id.0).collect::<Vec<_>>(), vec![3, 2]);
    }
}
