//! C6 — the matching algorithm proper: price–time priority crossing of
//! an incoming order against the opposite book side (spec §4.6).
//!
//! This module is pure with respect to concurrency: callers
//! ([`crate::engine::MatchingEngine`]) are responsible for holding the
//! per-symbol write lock for the duration of a call here. Nothing in this
//! module suspends, matching spec §5's "no suspension points inside the
//! matching critical section".

use crate::book::SymbolBook;
use crate::decimal::Amount;
use crate::events::{BookUpdatePayload, EventPayload, OrderUpdatePayload, SymbolBus};
use crate::ids::IdAllocator;
use crate::order::{Order, OrderKind, OrderStatus, Side, Trade};
use crate::registry::OrderRegistry;
use tracing::trace;

/// Outcome of running the matching algorithm for one incoming order.
pub struct MatchOutcome {
    pub trades: Vec<Trade>,
    pub order: Order,
}

/// Run the matching algorithm for `incoming` against `book`, mutating the
/// book and registry and publishing events as it goes.
///
/// `incoming` must already have been admitted (validated, assigned an ID,
/// and — for anything other than a fresh LIMIT/MARKET order — resolved to
/// one of those two kinds; STOP orders are armed rather than matched, see
/// [`crate::stop`]).
pub fn run(
    book: &mut SymbolBook,
    registry: &OrderRegistry,
    ids: &IdAllocator,
    bus: &SymbolBus,
    mut incoming: Order,
) -> MatchOutcome {
    debug_assert_ne!(incoming.kind, OrderKind::Stop, "stop orders do not match directly");

    let mut trades = Vec::new();
    let mut maker_updates = Vec::new();
    let mut book_updates = Vec::new();
    let opposite_side = incoming.side.opposite();

    'levels: loop {
        let mut remaining = incoming.remaining();
        if remaining.is_zero() {
            break;
        }

        let Some(best_price) = book.side(opposite_side).best_price() else {
            break;
        };

        if incoming.kind == OrderKind::Limit {
            let limit = incoming.price.expect("limit order without price");
            let stop_here = match incoming.side {
                Side::Buy => best_price > limit,
                Side::Sell => best_price < limit,
            };
            if stop_here {
                break;
            }
        }

        // Drain this level's queue, oldest admission first, until either
        // the incoming order is filled or the level is exhausted.
        loop {
            remaining = incoming.remaining();
            if remaining.is_zero() {
                break 'levels;
            }
            let level = book.side_mut(opposite_side).level_mut(best_price).unwrap();
            let Some(head_id) = level.front() else {
                break;
            };
            let head_remaining = level.remaining_of(head_id).unwrap();
            let executed = remaining.min(head_remaining);

            trace!(
                symbol = %book.symbol,
                price = %best_price,
                qty = %executed,
                maker = %head_id,
                taker = %incoming.id,
                "matching level"
            );

            let trade_id = ids.next_trade_id();
            let (buy_order_id, sell_order_id) = match incoming.side {
                Side::Buy => (incoming.id, head_id),
                Side::Sell => (head_id, incoming.id),
            };
            let trade = Trade {
                id: trade_id,
                symbol: book.symbol.clone(),
                buy_order_id,
                sell_order_id,
                quantity: executed,
                price: best_price,
                executed_at: chrono::Utc::now(),
            };
            book.trades.append(trade.clone());
            trades.push(trade);

            incoming.filled_quantity = incoming
                .filled_quantity
                .checked_add(executed)
                .expect("fill overflow");

            let finished_maker = level.apply_fill(head_id, executed);
            let maker_after = registry.mutate(head_id, |maker| {
                maker.filled_quantity = maker
                    .filled_quantity
                    .checked_add(executed)
                    .expect("fill overflow");
                maker.status = if finished_maker.is_some() {
                    OrderStatus::Filled
                } else {
                    OrderStatus::Partial
                };
                maker.updated_at = trade_ts();
            });
            if let Some(maker) = maker_after {
                maker_updates.push(OrderUpdatePayload::from(&maker));
            }

            if level.is_empty() {
                book.side_mut(opposite_side).erase(best_price);
                book_updates.push(BookUpdatePayload {
                    price: best_price,
                    total_remaining_quantity: Amount::ZERO,
                    order_count: 0,
                });
                break;
            } else {
                let level = book.side(opposite_side).level(best_price).unwrap();
                book_updates.push(BookUpdatePayload {
                    price: best_price,
                    total_remaining_quantity: level.total_remaining_quantity(),
                    order_count: level.order_count(),
                });
            }
        }
    }

    // Finalize the incoming order's resting/terminal state.
    let remaining = incoming.remaining();
    if remaining.is_zero() {
        incoming.status = OrderStatus::Filled;
    } else if incoming.kind == OrderKind::Limit {
        let price = incoming.price.expect("limit order without price");
        incoming.status = if incoming.filled_quantity.is_zero() {
            OrderStatus::Pending
        } else {
            OrderStatus::Partial
        };
        let level = book.side_mut(incoming.side).level_or_insert(price);
        level.enqueue(incoming.id, remaining);
        book_updates.push(BookUpdatePayload {
            price,
            total_remaining_quantity: level.total_remaining_quantity(),
            order_count: level.order_count(),
        });
    } else {
        // MARKET order with unfilled remainder: not rested, per spec §4.6
        // step 5 ("mark the remainder CANCELLED; still a successful
        // submission with partial fill if any").
        incoming.status = OrderStatus::Cancelled;
    }
    incoming.updated_at = trade_ts();

    registry.put(incoming.clone());

    // Emission order per spec §4.7: trades first (execution order), then
    // updates for the resting (maker) side, then the incoming order's own
    // update last.
    for trade in &trades {
        bus.publish(EventPayload::Trade(trade.clone()));
    }
    for update in maker_updates {
        bus.publish(EventPayload::OrderUpdate(update));
    }
    for update in book_updates {
        bus.publish(EventPayload::OrderBookUpdate(update));
    }
    bus.publish(EventPayload::OrderUpdate(OrderUpdatePayload::from(&incoming)));

    MatchOutcome {
        trades,
        order: incoming,
    }
}

fn trade_ts() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}
