//! C3 — price level: aggregate state at one (symbol, side, price).

use crate::decimal::Amount;
use crate::ids::OrderId;
use std::collections::VecDeque;

/// FIFO queue of resident orders at a single price, plus the aggregates
/// the book side needs without walking the queue (spec §3/§4.3).
///
/// Invariants maintained by every method on this type:
/// - `order_count() == queue length`
/// - `total_remaining_quantity() > 0 <=> order_count() > 0`
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    queue: VecDeque<OrderId>,
    remaining: std::collections::HashMap<OrderId, Amount>,
    total_remaining_quantity: Amount,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an order to the tail of the queue (time priority).
    pub fn enqueue(&mut self, order_id: OrderId, remaining_qty: Amount) {
        self.queue.push_back(order_id);
        self.remaining.insert(order_id, remaining_qty);
        self.total_remaining_quantity = self
            .total_remaining_quantity
            .checked_add(remaining_qty)
            .expect("price level quantity overflow");
    }

    /// Peek the order at the head of the queue without removing it.
    pub fn front(&self) -> Option<OrderId> {
        self.queue.front().copied()
    }

    /// Remaining quantity for a specific resident order.
    pub fn remaining_of(&self, order_id: OrderId) -> Option<Amount> {
        self.remaining.get(&order_id).copied()
    }

    /// Apply a fill of `executed_qty` to `order_id`'s remaining quantity.
    /// If the order is now fully filled, it is popped from the head of the
    /// queue (the caller is expected to only ever fill the current head,
    /// per price-time priority) and returned so callers can finalize it.
    pub fn apply_fill(&mut self, order_id: OrderId, executed_qty: Amount) -> Option<OrderId> {
        let remaining = self
            .remaining
            .get_mut(&order_id)
            .expect("apply_fill on an order not resident at this level");
        *remaining = remaining.saturating_sub(executed_qty);
        self.total_remaining_quantity = self.total_remaining_quantity.saturating_sub(executed_qty);

        if remaining.is_zero() {
            debug_assert_eq!(self.queue.front().copied(), Some(order_id));
            self.queue.pop_front();
            self.remaining.remove(&order_id);
            Some(order_id)
        } else {
            None
        }
    }

    /// Remove a specific order from the level (cancellation path). O(n) in
    /// the queue length; the common case the spec calls out (head removal
    /// on fill) goes through [`Self::apply_fill`] instead.
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        let Some(remaining) = self.remaining.remove(&order_id) else {
            return false;
        };
        self.queue.retain(|id| *id != order_id);
        self.total_remaining_quantity = self.total_remaining_quantity.saturating_sub(remaining);
        true
    }

    pub fn order_count(&self) -> usize {
        self.queue.len()
    }

    pub fn total_remaining_quantity(&self) -> Amount {
        self.total_remaining_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate resident order IDs in queue (time-priority) order.
    pub fn iter(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn enqueue_accumulates_aggregates() {
        let mut level = PriceLevel::new();
        level.enqueue(OrderId(1), amt("1.0"));
        level.enqueue(OrderId(2), amt("2.0"));
        assert_eq!(level.order_count(), 2);
        assert_eq!(level.total_remaining_quantity(), amt("3.0"));
        assert_eq!(level.front(), Some(OrderId(1)));
    }

    #[test]
    fn apply_fill_partial_keeps_order_resident() {
        let mut level = PriceLevel::new();
        level.enqueue(OrderId(1), amt("2.0"));
        let finished = level.apply_fill(OrderId(1), amt("1.0"));
        assert!(finished.is_none());
        assert_eq!(level.remaining_of(OrderId(1)), Some(amt("1.0")));
        assert_eq!(level.total_remaining_quantity(), amt("1.0"));
        assert_eq!(level.order_count(), 1);
    }

    #[test]
    fn apply_fill_full_pops_head() {
        let mut level = PriceLevel::new();
        level.enqueue(OrderId(1), amt("1.0"));
        level.enqueue(OrderId(2), amt("1.0"));
        let finished = level.apply_fill(OrderId(1), amt("1.0"));
        assert_eq!(finished, Some(OrderId(1)));
        assert_eq!(level.order_count(), 1);
        assert_eq!(level.front(), Some(OrderId(2)));
    }

    #[test]
    fn empties_when_last_order_removed() {
        let mut level = PriceLevel::new();
        level.enqueue(OrderId(1), amt("1.0"));
        assert!(level.remove(OrderId(1)));
        assert!(level.is_empty());
        assert_eq!(level.total_remaining_quantity(), Amount::ZERO);
    }

    #[test]
    fn remove_missing_order_is_noop() {
        let mut level = PriceLevel::new();
        level.enqueue(OrderId(1), amt("1.0"));
        assert!(!level.remove(OrderId(99)));
        assert_eq!(level.order_count(), 1);
    }

    #[test]
    fn iter_preserves_fifo_order() {
        let mut level = PriceLevel::new();
        level.enqueue(OrderId(1), amt("1.0"));
        level.enqueue(OrderId(2), amt("1.0"));
        level.enqueue(OrderId(3), amt("1.0"));
        assert_eq!(
            level.iter().collect::<Vec<_>>(),
            vec![OrderId(1), OrderId(2), OrderId(3)]
        );
    }
}
