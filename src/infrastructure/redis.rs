use crate::domain::order::{Order, OrderId};
use crate::domain::ports::OrderStore;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

/// Key prefix separating order records from anything else in the database.
const KEY_PREFIX: &str = "order:";

/// A persistent order store backed by Redis.
///
/// Records are whole-value JSON strings written with `SET .. EX`, so the
/// server enforces the TTL policy and reclaims expired records itself.
///
/// This struct is thread-safe (`Clone` shares the underlying client).
#[derive(Clone)]
pub struct RedisOrderStore {
    client: redis::Client,
}

impl RedisOrderStore {
    /// Opens a connection handle against the given Redis URL.
    ///
    /// The URL is only validated here; connections are established lazily
    /// per operation.
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }

    fn key(order_id: &OrderId) -> String {
        format!("{KEY_PREFIX}{order_id}")
    }
}

#[async_trait]
impl OrderStore for RedisOrderStore {
    async fn put(&self, order_id: &OrderId, order: Order, ttl: Duration) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let value = serde_json::to_string(&order)
            .map_err(|e| GatewayError::Store(format!("serialize order record: {e}")))?;

        // SET EX rejects a zero expiry; clamp up to the smallest window.
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(Self::key(order_id), value, ttl_secs).await?;

        Ok(())
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let raw: Option<String> = conn.get(Self::key(order_id)).await?;
        match raw {
            None => Ok(None),
            Some(raw) => {
                let order = serde_json::from_str(&raw)
                    .map_err(|e| GatewayError::Store(format!("deserialize order record: {e}")))?;
                Ok(Some(order))
            }
        }
    }
}
