use crate::config::GatewayConfig;
use crate::domain::ports::{SettlementEvent, SettlementNotifier};
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

/// Wire payload POSTed to the merchant's callback endpoint.
#[derive(Serialize)]
struct WebhookPayload<'a> {
    order_id: &'a str,
    status: &'static str,
    amount_paid: Decimal,
}

/// Delivers settlement notifications to merchant callback URLs.
///
/// Events are handed to a bounded queue drained by a single worker task,
/// so enqueueing never blocks the verification response. Delivery is
/// at-most-one attempt per event: a non-2xx response, a timeout, or a full
/// queue is logged and the event is dropped. Merchants reconcile missed
/// notifications through their own polling.
pub struct WebhookDispatcher {
    tx: mpsc::Sender<SettlementEvent>,
}

impl WebhookDispatcher {
    /// Starts the dispatcher and its worker task.
    ///
    /// The worker drains the queue until every `WebhookDispatcher` handle
    /// is dropped, then exits; await the returned handle for a clean
    /// shutdown.
    pub fn start(config: &GatewayConfig) -> Result<(Self, JoinHandle<()>)> {
        let client = reqwest::Client::builder()
            .timeout(config.webhook_timeout)
            .build()
            .map_err(|e| GatewayError::Store(format!("build webhook http client: {e}")))?;

        let (tx, rx) = mpsc::channel(config.webhook_queue_depth);
        let worker = tokio::spawn(run_worker(client, rx));

        Ok((Self { tx }, worker))
    }
}

impl SettlementNotifier for WebhookDispatcher {
    fn notify(&self, event: SettlementEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(order_id = %event.order_id, "webhook queue full, event dropped");
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(order_id = %event.order_id, "webhook worker stopped, event dropped");
            }
        }
    }
}

async fn run_worker(client: reqwest::Client, mut rx: mpsc::Receiver<SettlementEvent>) {
    tracing::info!("webhook dispatcher started");
    while let Some(event) = rx.recv().await {
        deliver(&client, &event).await;
    }
    tracing::info!("webhook dispatcher stopped");
}

async fn deliver(client: &reqwest::Client, event: &SettlementEvent) {
    let payload = WebhookPayload {
        order_id: event.order_id.as_str(),
        status: "SUCCESS",
        amount_paid: event.amount_paid,
    };

    match client.post(&event.callback_url).json(&payload).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::info!(
                order_id = %event.order_id,
                callback_url = %event.callback_url,
                "webhook delivered"
            );
        }
        Ok(response) => {
            tracing::warn!(
                order_id = %event.order_id,
                status = response.status().as_u16(),
                "webhook rejected by merchant endpoint"
            );
        }
        Err(err) => {
            tracing::warn!(order_id = %event.order_id, error = %err, "webhook delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderId;
    use rust_decimal_macros::dec;

    fn event() -> SettlementEvent {
        SettlementEvent {
            order_id: OrderId::generate(),
            callback_url: "http://127.0.0.1:9/webhook".to_string(),
            amount_paid: dec!(2.00),
        }
    }

    #[test]
    fn test_payload_shape() {
        let event = event();
        let payload = WebhookPayload {
            order_id: event.order_id.as_str(),
            status: "SUCCESS",
            amount_paid: event.amount_paid,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["order_id"], event.order_id.as_str());
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["amount_paid"], "2.00");
    }

    #[tokio::test]
    async fn test_notify_never_blocks_when_queue_is_full() {
        // Depth-1 queue with no worker draining it.
        let (tx, _rx) = mpsc::channel(1);
        let dispatcher = WebhookDispatcher { tx };

        dispatcher.notify(event());
        dispatcher.notify(event());
        dispatcher.notify(event());
    }

    #[tokio::test]
    async fn test_notify_after_worker_stopped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let dispatcher = WebhookDispatcher { tx };

        dispatcher.notify(event());
    }

    #[tokio::test]
    async fn test_worker_exits_when_handles_drop() {
        let (dispatcher, worker) =
            WebhookDispatcher::start(&GatewayConfig::default()).unwrap();
        drop(dispatcher);
        worker.await.unwrap();
    }
}
