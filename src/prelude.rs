//! Common imports for callers of this crate.

pub use crate::decimal::Amount;
pub use crate::engine::{EngineConfig, MatchingEngine, NewOrder};
pub use crate::error::{EngineError, EngineResult};
pub use crate::events::{BookSnapshotPayload, EventEnvelope, EventPayload};
pub use crate::ids::{OrderId, TradeId};
pub use crate::order::{Order, OrderKind, OrderStatus, Side, Trade};
