use super::order::{Order, OrderId, SettlementReport};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;

/// Durable, TTL-scoped storage for order records.
///
/// Every write replaces the whole record; there are no partial-field
/// updates and no compare-and-swap. Idempotency of terminal transitions is
/// the engine's responsibility.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists or overwrites a record with an expiry.
    async fn put(&self, order_id: &OrderId, order: Order, ttl: Duration) -> Result<()>;

    /// Fetches a record. Absence after expiry is indistinguishable from
    /// "never existed".
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>>;
}

/// Remote authority reporting whether funds were received for an order.
///
/// A single synchronous round-trip with no retry at this layer; retry
/// cadence belongs to the caller.
#[async_trait]
pub trait SettlementOracle: Send + Sync {
    async fn query(&self, order_id: &OrderId) -> Result<SettlementReport>;
}

/// A settlement outcome to be delivered to the merchant's callback URL.
#[derive(Debug, Clone)]
pub struct SettlementEvent {
    pub order_id: OrderId,
    pub callback_url: String,
    pub amount_paid: Decimal,
}

/// Fire-and-forget merchant notification.
///
/// Implementations must not block the caller and must contain delivery
/// failures entirely; an unreachable merchant endpoint never fails the
/// paying user's verification response.
pub trait SettlementNotifier: Send + Sync {
    fn notify(&self, event: SettlementEvent);
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type SettlementOracleBox = Box<dyn SettlementOracle>;
pub type SettlementNotifierBox = Box<dyn SettlementNotifier>;
