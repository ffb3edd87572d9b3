use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    pub stripe_secret_key: SecretString,
    /// Stripe price ID for the single configured plan.
    pub stripe_plan_id: String,
    /// The one customer this deployment serves (single-tenant design).
    pub stripe_customer_id: String,
    /// Base URL the checkout flow redirects back to (success/cancel pages).
    pub client_domain: Url,
    pub bind_addr: SocketAddr,
    /// When unset, CORS allows any origin.
    pub cors_origin: Option<HeaderValue>,
    /// Webhook signing secret. When unset, signature verification is skipped.
    pub stripe_webhook_secret: Option<SecretString>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let stripe_secret_key: SecretString =
            SecretString::new(get_env::<String>("STRIPE_SECRET_KEY").into());
        let stripe_plan_id: String = get_env("STRIPE_PLAN_ID");
        let stripe_customer_id: String = get_env("STRIPE_CUSTOMER_ID");
        let client_domain: Url = get_env("CLIENT_DOMAIN");
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "0.0.0.0:8080".parse().unwrap());

        let cors_origin: Option<HeaderValue> = std::env::var("CORS_ORIGIN").ok().map(|v| {
            v.parse()
                .expect("CORS_ORIGIN must be a valid header value")
        });

        let stripe_webhook_secret: Option<SecretString> = std::env::var("STRIPE_WEBHOOK_SECRET")
            .ok()
            .map(|v| SecretString::new(v.into()));

        Self {
            stripe_secret_key,
            stripe_plan_id,
            stripe_customer_id,
            client_domain,
            bind_addr,
            cors_origin,
            stripe_webhook_secret,
        }
    }
}
