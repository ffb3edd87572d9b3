//! Checkout session use cases: auto-trial creation and trial carry-over.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CheckoutSession, CheckoutSessionRequest, CustomerId, PaymentProviderPort, Subscription,
        TrialTag,
    },
};

/// Auto-trial length: 3 days plus a 5 second grace window, in milliseconds.
const AUTO_TRIAL_MS: i64 = 1000 * 60 * 60 * 24 * 3 + 5000;

pub struct CheckoutUseCases {
    provider: Arc<dyn PaymentProviderPort>,
    customer_id: CustomerId,
    plan_id: String,
    client_domain: String,
}

impl CheckoutUseCases {
    pub fn new(
        provider: Arc<dyn PaymentProviderPort>,
        customer_id: CustomerId,
        plan_id: String,
        client_domain: String,
    ) -> Self {
        Self {
            provider,
            customer_id,
            plan_id,
            client_domain: client_domain.trim_end_matches('/').to_string(),
        }
    }

    /// Create a checkout session for a new auto-trial subscription.
    ///
    /// The trial ends 3 days (plus grace) from now, computed once per call.
    pub async fn create_trial_session(&self) -> AppResult<CheckoutSession> {
        let trial_end = auto_trial_end(Utc::now().timestamp_millis());
        let request = self.session_request(TrialTag::Auto, Some(trial_end));

        debug!(?request, "Creating auto-trial checkout session");

        self.provider.create_checkout_session(&request).await
    }

    /// Create a checkout session for a full (post-trial) subscription.
    ///
    /// The trial end of the selected existing subscription, when present, is
    /// carried over so the new subscription continues the same trial window
    /// instead of starting a fresh one.
    pub async fn create_upgrade_session(&self) -> AppResult<CheckoutSession> {
        let customer = self.provider.retrieve_customer(&self.customer_id).await?;

        let selected = select_carry_over_subscription(customer.subscriptions)
            .ok_or(AppError::NoSubscriptions)?;

        debug!(
            subscription_id = %selected.id,
            trial_end = ?selected.trial_end,
            "Selected subscription for trial carry-over"
        );

        let request = self.session_request(TrialTag::Full, selected.trial_end);

        debug!(?request, "Creating full-subscription checkout session");

        self.provider.create_checkout_session(&request).await
    }

    fn session_request(&self, trial: TrialTag, trial_end: Option<i64>) -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            customer: self.customer_id.clone(),
            plan: self.plan_id.clone(),
            trial_end,
            trial,
            success_url: format!("{}/success", self.client_domain),
            cancel_url: format!("{}/cancel", self.client_domain),
        }
    }
}

/// Unix-seconds timestamp at which an auto trial started now would end.
fn auto_trial_end(now_ms: i64) -> i64 {
    (now_ms + AUTO_TRIAL_MS) / 1000
}

/// Pick the subscription whose trial window the upgrade should continue.
///
/// Subscriptions are sorted ascending by creation time (stable, so equal
/// timestamps keep their relative order) and the index-0 entry wins: the
/// oldest one under that sort, not the most recent.
fn select_carry_over_subscription(mut subscriptions: Vec<Subscription>) -> Option<Subscription> {
    subscriptions.sort_by(|a, b| a.created.cmp(&b.created));
    subscriptions.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{InMemoryPaymentProvider, create_test_subscription};

    fn use_cases(provider: Arc<InMemoryPaymentProvider>) -> CheckoutUseCases {
        CheckoutUseCases::new(
            provider,
            CustomerId::new("cus_test"),
            "price_test".to_string(),
            "https://app.example.com/".to_string(),
        )
    }

    #[test]
    fn auto_trial_end_is_three_days_plus_grace_in_seconds() {
        let now_ms = 1_700_000_000_000;
        let expected = (now_ms + 3 * 24 * 60 * 60 * 1000 + 5000) / 1000;
        assert_eq!(auto_trial_end(now_ms), expected);
    }

    #[test]
    fn carry_over_selects_oldest_subscription() {
        let subs = vec![
            create_test_subscription("sub_b", "cus_test", |s| s.created = 200),
            create_test_subscription("sub_a", "cus_test", |s| s.created = 100),
            create_test_subscription("sub_c", "cus_test", |s| s.created = 300),
        ];

        let selected = select_carry_over_subscription(subs).unwrap();
        assert_eq!(selected.id.as_str(), "sub_a");
    }

    #[test]
    fn carry_over_is_stable_for_equal_creation_times() {
        let subs = vec![
            create_test_subscription("sub_first", "cus_test", |s| s.created = 100),
            create_test_subscription("sub_second", "cus_test", |s| s.created = 100),
        ];

        let selected = select_carry_over_subscription(subs).unwrap();
        assert_eq!(selected.id.as_str(), "sub_first");
    }

    #[tokio::test]
    async fn trial_session_tags_auto_and_sets_trial_end() {
        let provider = Arc::new(InMemoryPaymentProvider::new());

        let before = auto_trial_end(Utc::now().timestamp_millis());
        let session = use_cases(provider.clone())
            .create_trial_session()
            .await
            .unwrap();
        let after = auto_trial_end(Utc::now().timestamp_millis());

        assert!(session.id.starts_with("cs_test_"));

        let requests = provider.created_sessions.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.trial, TrialTag::Auto);
        assert_eq!(request.customer.as_str(), "cus_test");
        assert_eq!(request.plan, "price_test");
        assert_eq!(request.success_url, "https://app.example.com/success");
        assert_eq!(request.cancel_url, "https://app.example.com/cancel");

        let trial_end = request.trial_end.unwrap();
        assert!(trial_end >= before && trial_end <= after);
    }

    #[tokio::test]
    async fn upgrade_session_carries_over_trial_end_of_oldest() {
        let provider = Arc::new(InMemoryPaymentProvider::new());
        provider.insert_subscription(create_test_subscription("sub_old", "cus_test", |s| {
            s.created = 100;
            s.trial_end = Some(9_999);
        }));
        provider.insert_subscription(create_test_subscription("sub_new", "cus_test", |s| {
            s.created = 200;
            s.trial_end = Some(1_111);
        }));

        use_cases(provider.clone())
            .create_upgrade_session()
            .await
            .unwrap();

        let requests = provider.created_sessions.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].trial, TrialTag::Full);
        assert_eq!(requests[0].trial_end, Some(9_999));
    }

    #[tokio::test]
    async fn upgrade_session_omits_trial_end_when_selected_has_none() {
        let provider = Arc::new(InMemoryPaymentProvider::new());
        provider.insert_subscription(create_test_subscription("sub_only", "cus_test", |s| {
            s.created = 100;
            s.trial_end = None;
        }));

        use_cases(provider.clone())
            .create_upgrade_session()
            .await
            .unwrap();

        let requests = provider.created_sessions.lock().unwrap();
        assert_eq!(requests[0].trial_end, None);
    }

    #[tokio::test]
    async fn upgrade_session_fails_without_subscriptions() {
        let provider = Arc::new(InMemoryPaymentProvider::new());

        let err = use_cases(provider)
            .create_upgrade_session()
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoSubscriptions));
    }
}
