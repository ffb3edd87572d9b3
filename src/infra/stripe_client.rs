use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::app_error::{AppError, AppResult};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: Client::new(),
            secret_key,
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:", self.secret_key));
        format!("Basic {}", encoded)
    }

    // ========================================================================
    // Checkout Sessions
    // ========================================================================

    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
        trial_end: Option<i64>,
        subscription_metadata: &HashMap<String, String>,
    ) -> AppResult<StripeCheckoutSession> {
        let mut params: Vec<(String, String)> = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("mode".to_string(), "subscription".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("line_items[0][price]".to_string(), price_id.to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ];

        if let Some(ts) = trial_end {
            params.push(("subscription_data[trial_end]".to_string(), ts.to_string()));
        }

        for (key, value) in subscription_metadata {
            params.push((
                format!("subscription_data[metadata][{}]", key),
                value.to_string(),
            ));
        }

        let response = self
            .client
            .post(format!("{}/checkout/sessions", STRIPE_API_BASE))
            .header("Authorization", self.auth_header())
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Customers
    // ========================================================================

    pub async fn get_customer(&self, customer_id: &str) -> AppResult<StripeCustomer> {
        let response = self
            .client
            .get(format!("{}/customers/{}", STRIPE_API_BASE, customer_id))
            .header("Authorization", self.auth_header())
            .query(&[("expand[]", "subscriptions")])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub async fn get_subscription(&self, subscription_id: &str) -> AppResult<StripeSubscription> {
        let response = self
            .client
            .get(format!(
                "{}/subscriptions/{}",
                STRIPE_API_BASE, subscription_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    pub async fn list_subscriptions(
        &self,
        customer_id: &str,
        status: Option<&str>,
        created_lt: Option<i64>,
    ) -> AppResult<Vec<StripeSubscription>> {
        let mut query: Vec<(String, String)> =
            vec![("customer".to_string(), customer_id.to_string())];
        if let Some(s) = status {
            query.push(("status".to_string(), s.to_string()));
        }
        if let Some(ts) = created_lt {
            query.push(("created[lt]".to_string(), ts.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/subscriptions", STRIPE_API_BASE))
            .header("Authorization", self.auth_header())
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        let list: StripeSubscriptionList = self.handle_response(response).await?;
        Ok(list.data)
    }

    pub async fn update_subscription(
        &self,
        subscription_id: &str,
        cancel_at: Option<i64>,
    ) -> AppResult<StripeSubscription> {
        let mut params: Vec<(String, String)> = Vec::new();
        if let Some(ts) = cancel_at {
            params.push(("cancel_at".to_string(), ts.to_string()));
        }

        let response = self
            .client
            .post(format!(
                "{}/subscriptions/{}",
                STRIPE_API_BASE, subscription_id
            ))
            .header("Authorization", self.auth_header())
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    pub async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<StripeSubscription> {
        let response = self
            .client
            .delete(format!(
                "{}/subscriptions/{}",
                STRIPE_API_BASE, subscription_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Webhook Signature Verification
    // ========================================================================

    pub fn verify_webhook_signature(
        payload: &str,
        signature_header: &str,
        webhook_secret: &str,
    ) -> AppResult<()> {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        // Parse signature header: "t=timestamp,v1=signature,..."
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            let kv: Vec<&str> = part.splitn(2, '=').collect();
            if kv.len() != 2 {
                continue;
            }
            match kv[0] {
                "t" => timestamp = Some(kv[1]),
                "v1" => signatures.push(kv[1]),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| AppError::InvalidInput("Missing timestamp in signature".into()))?;

        if signatures.is_empty() {
            return Err(AppError::InvalidInput("Missing signature".into()));
        }

        let signed_payload = format!("{}.{}", timestamp, payload);
        let mut mac = Hmac::<Sha256>::new_from_slice(webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("HMAC error".into()))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        for sig in signatures {
            if constant_time_compare(sig, &expected) {
                // Verify timestamp is not too old (5 minutes tolerance)
                let ts: i64 = timestamp
                    .parse()
                    .map_err(|_| AppError::InvalidInput("Invalid timestamp".into()))?;
                let now = chrono::Utc::now().timestamp();
                if (now - ts).abs() > 300 {
                    return Err(AppError::InvalidInput("Timestamp too old".into()));
                }
                return Ok(());
            }
        }

        Err(AppError::InvalidInput("Invalid signature".into()))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe API error");

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(AppError::NotFound);
            }

            if let Ok(error) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(AppError::Provider(format!(
                    "Stripe error: {}",
                    error.error.message.unwrap_or(error.error.error_type)
                )));
            }

            return Err(AppError::Provider(format!(
                "Stripe API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Stripe response");
            AppError::Provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
    pub subscriptions: Option<StripeSubscriptionList>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub customer: Option<String>,
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub created: i64,
    pub trial_start: Option<i64>,
    pub trial_end: Option<i64>,
    pub cancel_at: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionList {
    pub data: Vec<StripeSubscription>,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeError,
}

#[derive(Debug, Deserialize)]
pub struct StripeError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: Option<String>,
    pub code: Option<String>,
}
