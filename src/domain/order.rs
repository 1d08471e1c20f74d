use crate::error::GatewayError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, used for order ids and audit stamps.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Represents a positive monetary amount owed on an order.
///
/// Wraps `rust_decimal::Decimal` so amount comparisons use exact decimal
/// semantics; a legitimate exact payment can never be misclassified as
/// underpaid by float rounding.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, GatewayError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(GatewayError::Validation(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = GatewayError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally shareable order identifier: `ORD_<unix millis>_<random hex>`.
///
/// The time component keeps ids sortable for auditing; the random component
/// makes them unguessable enough to prevent enumeration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct OrderId(String);

impl OrderId {
    pub fn generate() -> Self {
        let suffix: u16 = rand::random();
        Self(format!("ORD_{}_{:04x}", unix_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Success,
    Fraud,
}

impl OrderStatus {
    /// Terminal states permit no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// The persisted order record. Every store write replaces the whole record;
/// only the verification engine writes `status`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub amount_expected: Amount,
    pub status: OrderStatus,
    pub callback_url: Option<String>,
    pub return_url: Option<String>,
    pub created_at: u64,
}

impl Order {
    pub fn new(
        amount_expected: Amount,
        callback_url: Option<String>,
        return_url: Option<String>,
    ) -> Self {
        Self {
            amount_expected,
            status: OrderStatus::Pending,
            callback_url,
            return_url,
            created_at: unix_millis(),
        }
    }

    /// Marks the order settled in full (or over). Fails if the order has
    /// already reached a terminal state; status is monotonic.
    pub fn settle(&mut self) -> Result<(), GatewayError> {
        if self.status.is_terminal() {
            return Err(GatewayError::Validation(
                "Order already in a terminal state".to_string(),
            ));
        }
        self.status = OrderStatus::Success;
        Ok(())
    }

    /// Marks the order fraudulent (settled for less than expected). Same
    /// monotonicity guard as [`Order::settle`].
    pub fn flag_fraud(&mut self) -> Result<(), GatewayError> {
        if self.status.is_terminal() {
            return Err(GatewayError::Validation(
                "Order already in a terminal state".to_string(),
            ));
        }
        self.status = OrderStatus::Fraud;
        Ok(())
    }
}

/// What the settlement authority reports for one order.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementReport {
    /// Funds not (yet) received.
    NotSettled,
    /// Funds received; the amount is untrusted until checked by the engine.
    Settled { amount_received: Decimal },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(GatewayError::Validation(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-2.5)),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_order_id_format() {
        let id = OrderId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Fraud).unwrap(),
            "\"FRAUD\""
        );
    }

    #[test]
    fn test_settle_is_monotonic() {
        let mut order = Order::new(Amount::new(dec!(2.00)).unwrap(), None, None);
        assert!(order.settle().is_ok());
        assert_eq!(order.status, OrderStatus::Success);

        // A second terminal transition is rejected, in either direction.
        assert!(order.settle().is_err());
        assert!(order.flag_fraud().is_err());
        assert_eq!(order.status, OrderStatus::Success);
    }

    #[test]
    fn test_flag_fraud_is_monotonic() {
        let mut order = Order::new(Amount::new(dec!(2.00)).unwrap(), None, None);
        assert!(order.flag_fraud().is_ok());
        assert_eq!(order.status, OrderStatus::Fraud);
        assert!(order.settle().is_err());
        assert_eq!(order.status, OrderStatus::Fraud);
    }

    #[test]
    fn test_order_record_round_trip() {
        let order = Order::new(
            Amount::new(dec!(2.00)).unwrap(),
            Some("https://seller.example/webhook".to_string()),
            Some("https://seller.example/shop?status=paid".to_string()),
        );

        let raw = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, order);
        assert!(raw.contains("\"PENDING\""));
    }
}
