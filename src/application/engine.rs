use crate::config::GatewayConfig;
use crate::domain::order::{Amount, Order, OrderId, OrderStatus, SettlementReport};
use crate::domain::ports::{
    OrderStoreBox, SettlementEvent, SettlementNotifierBox, SettlementOracleBox,
};
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use std::time::Duration;

/// Outcome of a verification attempt, as surfaced to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub status: OrderStatus,
    pub redirect_to: Option<String>,
}

impl Verification {
    fn from_terminal(order: &Order) -> Self {
        Self {
            status: order.status,
            redirect_to: if order.status == OrderStatus::Success {
                order.return_url.clone()
            } else {
                None
            },
        }
    }
}

/// Orchestrates the order lifecycle: create, fetch for display, and verify
/// settlement against the remote oracle.
///
/// `VerificationEngine` is the only writer of order status. It owns boxed
/// port implementations so tests can inject in-memory fakes, and it holds
/// no state of its own across requests; everything durable lives in the
/// order store.
pub struct VerificationEngine {
    store: OrderStoreBox,
    oracle: SettlementOracleBox,
    notifier: SettlementNotifierBox,
    pending_ttl: Duration,
    terminal_ttl: Duration,
}

impl VerificationEngine {
    /// Creates a new `VerificationEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The TTL-scoped order record store.
    /// * `oracle` - The settlement authority client.
    /// * `notifier` - The merchant webhook dispatcher.
    /// * `config` - TTL policy for pending and terminal records.
    pub fn new(
        store: OrderStoreBox,
        oracle: SettlementOracleBox,
        notifier: SettlementNotifierBox,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            notifier,
            pending_ttl: config.pending_ttl,
            terminal_ttl: config.terminal_ttl,
        }
    }

    /// Creates a PENDING order and persists it for the payment window.
    pub async fn create(
        &self,
        amount: Decimal,
        callback_url: Option<String>,
        return_url: Option<String>,
    ) -> Result<(OrderId, Order)> {
        let amount = Amount::new(amount)?;
        let order_id = OrderId::generate();
        let order = Order::new(amount, callback_url, return_url);

        self.store
            .put(&order_id, order.clone(), self.pending_ttl)
            .await?;
        tracing::info!(order_id = %order_id, amount = %order.amount_expected, "order created");

        Ok((order_id, order))
    }

    /// Read-only fetch for the paying client's display.
    pub async fn fetch(&self, order_id: &OrderId) -> Result<Order> {
        self.store
            .get(order_id)
            .await?
            .ok_or(GatewayError::OrderNotFound)
    }

    /// Verifies the settlement status of an order.
    ///
    /// Terminal orders short-circuit without touching the oracle or
    /// re-firing the webhook. An oracle failure propagates without mutating
    /// stored state, so the order stays PENDING and retryable.
    pub async fn verify(&self, order_id: &OrderId) -> Result<Verification> {
        let order = self
            .store
            .get(order_id)
            .await?
            .ok_or(GatewayError::OrderNotFound)?;

        if order.status.is_terminal() {
            return Ok(Verification::from_terminal(&order));
        }

        let amount_received = match self.oracle.query(order_id).await? {
            SettlementReport::NotSettled => {
                return Ok(Verification {
                    status: OrderStatus::Pending,
                    redirect_to: None,
                });
            }
            SettlementReport::Settled { amount_received } => amount_received,
        };

        // The store offers no compare-and-swap, so re-read right before the
        // terminal write: a concurrent verifier that already won keeps its
        // state and the webhook is not fired a second time.
        let mut order = match self.store.get(order_id).await? {
            None => return Err(GatewayError::OrderNotFound),
            Some(current) if current.status.is_terminal() => {
                return Ok(Verification::from_terminal(&current));
            }
            Some(current) => current,
        };

        // Inclusive comparison in exact decimal semantics: overpayment is
        // accepted, underpayment is not.
        if amount_received >= order.amount_expected.value() {
            order.settle()?;
            self.store
                .put(order_id, order.clone(), self.terminal_ttl)
                .await?;
            tracing::info!(order_id = %order_id, amount_paid = %amount_received, "order settled");

            if let Some(callback_url) = order.callback_url.clone() {
                self.notifier.notify(SettlementEvent {
                    order_id: order_id.clone(),
                    callback_url,
                    amount_paid: amount_received,
                });
            }

            Ok(Verification {
                status: OrderStatus::Success,
                redirect_to: order.return_url,
            })
        } else {
            order.flag_fraud()?;
            self.store.put(order_id, order, self.terminal_ttl).await?;
            tracing::warn!(
                order_id = %order_id,
                amount_received = %amount_received,
                "settled below expected amount, order flagged as fraud"
            );

            Ok(Verification {
                status: OrderStatus::Fraud,
                redirect_to: None,
            })
        }
    }
}
