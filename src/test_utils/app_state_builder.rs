//! Test app state builder for HTTP-level testing.

use std::sync::Arc;

use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::ports::payment_provider::{CustomerId, PaymentProviderPort},
    infra::config::AppConfig,
    test_utils::InMemoryPaymentProvider,
    use_cases::{checkout::CheckoutUseCases, webhook::WebhookUseCases},
};

/// Builds a minimal `AppState` backed by `InMemoryPaymentProvider`.
pub struct TestAppStateBuilder {
    provider: Arc<InMemoryPaymentProvider>,
    customer_id: String,
    plan_id: String,
    client_domain: String,
    webhook_secret: Option<String>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            provider: Arc::new(InMemoryPaymentProvider::new()),
            customer_id: "cus_test".to_string(),
            plan_id: "price_test".to_string(),
            client_domain: "https://app.example.com".to_string(),
            webhook_secret: None,
        }
    }

    /// Handle on the mock provider for seeding state and asserting calls.
    pub fn provider(&self) -> Arc<InMemoryPaymentProvider> {
        self.provider.clone()
    }

    pub fn with_webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = Some(secret.to_string());
        self
    }

    pub fn build(self) -> AppState {
        let config = AppConfig {
            stripe_secret_key: SecretString::new("sk_test_dummy".into()),
            stripe_plan_id: self.plan_id.clone(),
            stripe_customer_id: self.customer_id.clone(),
            client_domain: Url::parse(&self.client_domain).unwrap(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cors_origin: None,
            stripe_webhook_secret: self
                .webhook_secret
                .map(|s| SecretString::new(s.into())),
        };

        let provider = self.provider as Arc<dyn PaymentProviderPort>;
        let customer_id = CustomerId::new(self.customer_id);

        let checkout_use_cases = CheckoutUseCases::new(
            provider.clone(),
            customer_id.clone(),
            config.stripe_plan_id.clone(),
            self.client_domain,
        );

        let webhook_use_cases = WebhookUseCases::new(provider, customer_id);

        AppState {
            config: Arc::new(config),
            checkout_use_cases: Arc::new(checkout_use_cases),
            webhook_use_cases: Arc::new(webhook_use_cases),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
