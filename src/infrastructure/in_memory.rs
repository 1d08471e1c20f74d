use crate::domain::order::{Order, OrderId};
use crate::domain::ports::OrderStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    order: Order,
    expires_at: Instant,
}

/// A thread-safe in-memory order store with per-record expiry.
///
/// Uses `Arc<RwLock<HashMap<String, Entry>>>` to allow shared concurrent
/// access. Expiry is enforced lazily on read, which makes an expired record
/// indistinguishable from one that never existed. Ideal for testing or
/// single-process deployments where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put(&self, order_id: &OrderId, order: Order, ttl: Duration) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(
            order_id.as_str().to_string(),
            Entry {
                order,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>> {
        {
            let orders = self.orders.read().await;
            match orders.get(order_id.as_str()) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.order.clone()));
                }
                Some(_) => {}
            }
        }

        // Expired: reclaim under the write lock, re-checking in case a
        // concurrent writer re-persisted the record in between.
        let mut orders = self.orders.write().await;
        match orders.get(order_id.as_str()) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.order.clone())),
            Some(_) => {
                orders.remove(order_id.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
