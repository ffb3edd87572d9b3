//! Checkout-completion webhook route.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::info;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::ports::payment_provider::SubscriptionId,
    infra::stripe_client::StripeClient,
};

#[derive(Deserialize)]
struct WebhookEvent {
    data: WebhookEventData,
}

#[derive(Deserialize)]
struct WebhookEventData {
    object: WebhookEventObject,
}

#[derive(Deserialize)]
struct WebhookEventObject {
    subscription: String,
}

/// POST /webhook/subscription-complete
/// Provider notification that a checkout finished; reconciles overlapping
/// trial subscriptions for the configured customer.
async fn subscription_complete(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    if let Some(secret) = app_state.config.stripe_webhook_secret.as_ref() {
        let signature = headers
            .get("stripe-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::InvalidInput("Missing Stripe signature".into()))?;

        StripeClient::verify_webhook_signature(&body, signature, secret.expose_secret())?;
    }

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;

    let subscription_id = SubscriptionId::new(event.data.object.subscription);

    let report = app_state
        .webhook_use_cases
        .handle_subscription_complete(&subscription_id)
        .await?;

    let failed = report
        .cancellations
        .iter()
        .filter(|o| o.result.is_err())
        .count();
    info!(
        subscription_id = %subscription_id,
        scheduled = ?report.scheduled,
        attempted = report.cancellations.len(),
        failed,
        "Reconciled trial subscriptions"
    );

    Ok(Json(serde_json::json!({})))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/subscription-complete", post(subscription_complete))
}
