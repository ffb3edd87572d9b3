use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{checkout::CheckoutUseCases, webhook::WebhookUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub checkout_use_cases: Arc<CheckoutUseCases>,
    pub webhook_use_cases: Arc<WebhookUseCases>,
}
