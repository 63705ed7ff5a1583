pub mod razorpay;

use async_trait::async_trait;
use thiserror::Error;

pub use razorpay::RazorpayGateway;

/// Currency every order is denominated in.
pub const CURRENCY: &str = "INR";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected the call ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// An order handle issued by the gateway. Only the id is persisted, on the
/// booking row, once a booking exists.
#[derive(Debug, Clone)]
pub struct OrderHandle {
    pub order_id: String,
    pub amount_minor_units: i64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct RefundHandle {
    pub refund_id: String,
}

/// The three gateway operations the booking flow needs. Injected into the
/// handlers as `web::Data<Arc<dyn PaymentGateway>>` so tests can substitute
/// a stub.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment order for the given amount in minor units.
    async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<OrderHandle, GatewayError>;

    /// Look up an existing order by id. Used at verify time to reconcile the
    /// paid order against the stay being booked: a valid signature only
    /// proves the client paid *some* order, not this one's amount.
    async fn fetch_order(&self, order_id: &str) -> Result<OrderHandle, GatewayError>;

    /// Recompute the keyed hash over `order_id|payment_id` and compare it to
    /// the supplied signature. A mismatch is an ordinary `false`, never an
    /// error: callers branch on it.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Refund a captured payment. Failure here is surfaced to the canceling
    /// actor as a warning; it never blocks the cancellation itself.
    async fn refund(
        &self,
        payment_id: &str,
        amount_minor_units: i64,
    ) -> Result<RefundHandle, GatewayError>;
}

/// Whether a fetched order actually covers a stay with the given total.
/// Guards against a client paying a cheap order and attaching its (valid)
/// signature to a pricier booking request.
pub fn order_matches_stay(order: &OrderHandle, total_price: f64) -> bool {
    order.currency == CURRENCY
        && order.amount_minor_units == crate::models::bookings::amount_minor_units(total_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(amount_minor_units: i64, currency: &str) -> OrderHandle {
        OrderHandle {
            order_id: "order_abc".to_string(),
            amount_minor_units,
            currency: currency.to_string(),
        }
    }

    #[test]
    fn order_for_the_exact_stay_total_matches() {
        assert!(order_matches_stay(&order(30000, CURRENCY), 300.0));
    }

    #[test]
    fn cheaper_or_pricier_order_does_not_match() {
        assert!(!order_matches_stay(&order(10000, CURRENCY), 300.0));
        assert!(!order_matches_stay(&order(50000, CURRENCY), 300.0));
    }

    #[test]
    fn wrong_currency_does_not_match() {
        assert!(!order_matches_stay(&order(30000, "USD"), 300.0));
    }
}
