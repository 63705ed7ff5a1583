use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use super::{GatewayError, OrderHandle, PaymentGateway, RefundHandle};

const API_BASE: &str = "https://api.razorpay.com/v1";

type HmacSha256 = Hmac<Sha256>;

/// Razorpay HTTP client. Orders and refunds go over the wire with basic auth;
/// signature verification is local (HMAC-SHA256 keyed with the API secret).
pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
}

impl RazorpayGateway {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at a different endpoint (stub server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }
        Ok(response)
    }

    async fn get_json(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<OrderHandle, GatewayError> {
        let response = self
            .post_json(
                "/orders",
                serde_json::json!({
                    "amount": amount_minor_units,
                    "currency": currency,
                    "receipt": receipt,
                    "payment_capture": 1,
                }),
            )
            .await?;

        let order: OrderResponse = response.json().await?;
        debug!(order_id = %order.id, amount = order.amount, "created payment order");

        Ok(OrderHandle {
            order_id: order.id,
            amount_minor_units: order.amount,
            currency: order.currency,
        })
    }

    async fn fetch_order(&self, order_id: &str) -> Result<OrderHandle, GatewayError> {
        let response = self.get_json(&format!("/orders/{order_id}")).await?;
        let order: OrderResponse = response.json().await?;

        Ok(OrderHandle {
            order_id: order.id,
            amount_minor_units: order.amount,
            currency: order.currency,
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(supplied) = hex::decode(signature) else {
            return false;
        };

        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());

        // Constant-time comparison via the Mac trait.
        mac.verify_slice(&supplied).is_ok()
    }

    async fn refund(
        &self,
        payment_id: &str,
        amount_minor_units: i64,
    ) -> Result<RefundHandle, GatewayError> {
        let response = self
            .post_json(
                &format!("/payments/{payment_id}/refund"),
                serde_json::json!({ "amount": amount_minor_units }),
            )
            .await?;

        let refund: RefundResponse = response.json().await?;
        debug!(refund_id = %refund.id, payment_id, "refund issued");

        Ok(RefundHandle {
            refund_id: refund.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-key-secret";

    fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_correctly_signed_payment() {
        let gateway = RazorpayGateway::new("key_id", SECRET);
        let signature = sign("order_abc", "pay_xyz", SECRET);
        assert!(gateway.verify_signature("order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn rejects_a_signature_from_the_wrong_secret() {
        let gateway = RazorpayGateway::new("key_id", SECRET);
        let signature = sign("order_abc", "pay_xyz", "some-other-secret");
        assert!(!gateway.verify_signature("order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn rejects_a_signature_over_different_ids() {
        let gateway = RazorpayGateway::new("key_id", SECRET);
        let signature = sign("order_abc", "pay_xyz", SECRET);
        assert!(!gateway.verify_signature("order_abc", "pay_other", &signature));
        assert!(!gateway.verify_signature("order_other", "pay_xyz", &signature));
    }

    #[test]
    fn rejects_garbage_signatures_without_panicking() {
        let gateway = RazorpayGateway::new("key_id", SECRET);
        assert!(!gateway.verify_signature("order_abc", "pay_xyz", "not-hex!!"));
        assert!(!gateway.verify_signature("order_abc", "pay_xyz", ""));
        assert!(!gateway.verify_signature("order_abc", "pay_xyz", "deadbeef"));
    }
}
