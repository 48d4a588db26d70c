//! C4 — book side: a sorted collection of price levels for one
//! (symbol, side), with best-price peek, insert, and erase in O(log N).
//!
//! Per the redesign note in spec §9, this is a balanced tree keyed by
//! price rather than a heap-plus-dictionary pair: a heap cannot delete an
//! arbitrary price in better than O(N), which is exactly the operation
//! cancellation and level-emptying need.

use crate::decimal::Amount;
use crate::order::Side;
use crate::price_level::PriceLevel;
use std::collections::BTreeMap;

/// One side (bids or asks) of a single symbol's book.
///
/// Bids are ordered so "best" means highest price; asks so "best" means
/// lowest. `BTreeMap` is naturally ascending, so the bid side iterates in
/// reverse to walk best-to-worst.
#[derive(Debug, Default)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<Amount, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// The best resting price on this side, if any.
    pub fn best_price(&self) -> Option<Amount> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// Look up the level at an exact price.
    pub fn level(&self, price: Amount) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn level_mut(&mut self, price: Amount) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Get the level at `price`, creating an empty one lazily if absent.
    pub fn level_or_insert(&mut self, price: Amount) -> &mut PriceLevel {
        self.levels.entry(price).or_default()
    }

    /// Remove the level at `price` entirely (called once it has emptied).
    pub fn erase(&mut self, price: Amount) {
        self.levels.remove(&price);
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterate price levels from best outward (the order the matching
    /// algorithm walks the opposite side in, spec §4.6 step 2).
    pub fn iter_best_to_worst(&self) -> Box<dyn Iterator<Item = (Amount, &PriceLevel)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev().map(|(p, l)| (*p, l))),
            Side::Sell => Box::new(self.levels.iter().map(|(p, l)| (*p, l))),
        }
    }

    /// Top `depth` levels from best outward, as `(price, total_qty, order_count)`.
    pub fn top_n(&self, depth: usize) -> Vec<(Amount, Amount, usize)> {
        self.iter_best_to_worst()
            .take(depth)
            .map(|(price, level)| (price, level.total_remaining_quantity(), level.order_count()))
            .collect()
    }
}
