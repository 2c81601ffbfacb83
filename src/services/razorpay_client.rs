// src/services/razorpay_client.rs
// DOCUMENTATION: Razorpay Orders API client with a demo-mode fallback
// PURPOSE: Create checkout orders and verify checkout signatures

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{to_paise, OrderResponse, PaymentGateway, DEMO_ORDER_PREFIX};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

/// Razorpay API client
/// DOCUMENTATION: In demo mode no request leaves the process; orders are
/// synthesized and only demo orders are accepted by `verify_signature`
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    key_id: String,
    key_secret: String,
    demo: bool,
    base_url: String,
}

/// Body of POST /v1/orders
#[derive(Debug, Serialize)]
struct OrderPayload<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: Value,
}

/// Subset of the Razorpay order object we use
#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    currency: String,
}

impl RazorpayClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
            demo: config.is_payment_demo(),
            base_url: "https://api.razorpay.com/v1".to_string(),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Public key handed to the checkout widget
    pub fn key_id(&self) -> &str {
        if self.key_id.is_empty() {
            "rzp_demo"
        } else {
            &self.key_id
        }
    }

    /// Create an order for `amount` rupees
    pub async fn create_order(
        &self,
        amount: f64,
        currency: &str,
        receipt: &str,
        notes: Value,
    ) -> Result<OrderResponse, ApiError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ApiError::InvalidInput(
                "Amount must be greater than zero".to_string(),
            ));
        }
        let paise = to_paise(amount);

        if self.demo {
            let nonce = uuid::Uuid::new_v4().simple().to_string();
            let id = format!(
                "{}{}_{}",
                DEMO_ORDER_PREFIX,
                chrono::Utc::now().timestamp_millis(),
                &nonce[..8]
            );
            log::info!("Demo order {} created for {} paise", id, paise);
            return Ok(OrderResponse {
                id,
                amount: paise,
                currency: currency.to_string(),
                key_id: self.key_id().to_string(),
                is_demo: true,
            });
        }

        let payload = OrderPayload {
            amount: paise,
            currency,
            receipt,
            notes,
        };

        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("Razorpay order request failed: {}", e);
                ApiError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Razorpay order error {}: {}", status, body);
            return Err(ApiError::ExternalApiError(format!(
                "Failed to create payment order ({})",
                status
            )));
        }

        let order: RazorpayOrder = response.json().await.map_err(|e| {
            log::error!("Failed to parse Razorpay order: {}", e);
            ApiError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        log::info!("Razorpay order {} created for {} paise", order.id, order.amount);
        Ok(OrderResponse {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.key_id.clone(),
            is_demo: false,
        })
    }

    /// Check a checkout callback and report which gateway settled it
    /// DOCUMENTATION: Real orders need a hex HMAC-SHA256 of "order_id|payment_id"
    /// keyed with the key secret; demo orders pass only while demo mode is on
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<PaymentGateway, ApiError> {
        if order_id.trim().is_empty() || payment_id.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Order id and payment id are required".to_string(),
            ));
        }

        if order_id.starts_with(DEMO_ORDER_PREFIX) {
            if self.demo {
                log::info!("Accepted demo payment {} for {}", payment_id, order_id);
                return Ok(PaymentGateway::Demo);
            }
            log::warn!("Rejected demo order {} while demo mode is off", order_id);
            return Err(ApiError::InvalidInput(
                "Demo payments are not accepted".to_string(),
            ));
        }

        if self.key_secret.is_empty() {
            return Err(ApiError::ServiceUnavailable(
                "Payment gateway not configured".to_string(),
            ));
        }

        if signature_matches(&self.key_secret, order_id, payment_id, signature) {
            Ok(PaymentGateway::Razorpay)
        } else {
            log::warn!("Invalid payment signature for order {}", order_id);
            Err(ApiError::InvalidInput("Invalid payment signature".to_string()))
        }
    }
}

fn mac_for(secret: &str, order_id: &str, payment_id: &str) -> Option<Hmac<Sha256>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    Some(mac)
}

/// Constant-time signature comparison via `Mac::verify_slice`
fn signature_matches(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    match mac_for(secret, order_id, payment_id) {
        Some(mac) => mac.verify_slice(&expected).is_ok(),
        None => false,
    }
}

/// Signature Razorpay would send for an order/payment pair
#[cfg(test)]
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
    mac_for(secret, order_id, payment_id)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_client() -> RazorpayClient {
        let mut config = Config::for_tests();
        config.razorpay_key_id = "rzp_test_key".to_string();
        config.razorpay_key_secret = "rzp_test_secret".to_string();
        RazorpayClient::new(&config)
    }

    fn demo_client() -> RazorpayClient {
        RazorpayClient::new(&Config::for_tests())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let client = live_client();
        let signature = sign("rzp_test_secret", "order_abc", "pay_xyz");
        assert_eq!(
            client
                .verify_signature("order_abc", "pay_xyz", &signature)
                .unwrap(),
            PaymentGateway::Razorpay
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let client = live_client();
        let signature = sign("rzp_test_secret", "order_abc", "pay_xyz");

        assert!(client
            .verify_signature("order_abc", "pay_other", &signature)
            .is_err());
        assert!(client
            .verify_signature("order_abc", "pay_xyz", "not-hex")
            .is_err());

        let forged = sign("wrong_secret", "order_abc", "pay_xyz");
        assert!(client
            .verify_signature("order_abc", "pay_xyz", &forged)
            .is_err());
    }

    #[test]
    fn test_demo_orders_only_in_demo_mode() {
        let order = format!("{}1700000000000", DEMO_ORDER_PREFIX);

        assert_eq!(
            demo_client()
                .verify_signature(&order, "pay_demo_1", "")
                .unwrap(),
            PaymentGateway::Demo
        );
        assert!(live_client()
            .verify_signature(&order, "pay_demo_1", "")
            .is_err());
    }

    #[test]
    fn test_missing_ids_rejected() {
        assert!(demo_client().verify_signature("", "pay", "sig").is_err());
    }

    #[tokio::test]
    async fn test_demo_order_is_synthesized() {
        let client = demo_client();
        let order = client
            .create_order(1178.82, "INR", "rcpt_1", Value::Null)
            .await
            .unwrap();

        assert!(order.id.starts_with(DEMO_ORDER_PREFIX));
        assert_eq!(order.amount, 117882);
        assert!(order.is_demo);
        assert_eq!(order.key_id, "rzp_demo");
    }

    #[tokio::test]
    async fn test_demo_order_ids_are_distinct() {
        let client = demo_client();
        let first = client
            .create_order(10.0, "INR", "rcpt_1", Value::Null)
            .await
            .unwrap();
        let second = client
            .create_order(10.0, "INR", "rcpt_1", Value::Null)
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let result = demo_client()
            .create_order(0.0, "INR", "rcpt_1", Value::Null)
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}
