use crate::config::GatewayConfig;
use crate::domain::order::{OrderId, SettlementReport};
use crate::domain::ports::SettlementOracle;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Status value the authority reports for a completed settlement.
const TXN_SUCCESS: &str = "TXN_SUCCESS";

/// Settlement oracle client for a Paytm-style order-status endpoint.
///
/// One GET per query, no retries at this layer. The caller decides whether
/// and when to ask again.
pub struct PaytmOracle {
    http: reqwest::Client,
    base_url: String,
    merchant_id: String,
}

/// Raw order-status payload. Both fields are untrusted input and parsed
/// defensively; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct OrderStatusResponse {
    #[serde(rename = "STATUS")]
    status: Option<String>,
    #[serde(rename = "TXNAMOUNT")]
    txn_amount: Option<String>,
}

impl PaytmOracle {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.oracle_timeout)
            .build()
            .map_err(|e| GatewayError::OracleUnavailable(format!("build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.oracle_base_url.clone(),
            merchant_id: config.merchant_id.clone(),
        })
    }
}

fn parse_report(response: OrderStatusResponse) -> Result<SettlementReport> {
    // A missing or unknown status means "not yet settled", never an error.
    if response.status.as_deref() != Some(TXN_SUCCESS) {
        return Ok(SettlementReport::NotSettled);
    }

    let raw_amount = response.txn_amount.ok_or_else(|| {
        GatewayError::OracleUnavailable("settled response missing TXNAMOUNT".to_string())
    })?;
    let amount_received = Decimal::from_str(raw_amount.trim()).map_err(|e| {
        GatewayError::OracleUnavailable(format!("non-numeric TXNAMOUNT {raw_amount:?}: {e}"))
    })?;

    Ok(SettlementReport::Settled { amount_received })
}

#[async_trait]
impl SettlementOracle for PaytmOracle {
    async fn query(&self, order_id: &OrderId) -> Result<SettlementReport> {
        let params = serde_json::json!({
            "MID": self.merchant_id,
            "ORDERID": order_id,
        });

        let response = self
            .http
            .get(format!("{}/order/status", self.base_url))
            .query(&[("JsonData", params.to_string())])
            .send()
            .await
            .map_err(|e| GatewayError::OracleUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::OracleUnavailable(e.to_string()))?;

        let payload: OrderStatusResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::OracleUnavailable(format!("malformed payload: {e}")))?;

        parse_report(payload)
    }
}
