use crate::domain::order::OrderId;
use rust_decimal::Decimal;

/// Formats the UPI payment descriptor for one order.
///
/// The order id rides along as both transaction reference (`tr`) and note
/// (`tn`) so the settlement authority echoes it back verbatim. Generated
/// server-side only; the paying client never supplies its own descriptor.
pub fn payment_string(vpa: &str, payee_name: &str, order_id: &OrderId, amount: Decimal) -> String {
    format!(
        "upi://pay?pa={vpa}&am={amount}&pn={payee_name}&tr={order_id}&tn={order_id}&cu=INR"
    )
}
