use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CheckoutSession, CheckoutSessionRequest, Customer, CustomerId, PaymentProviderPort,
        Subscription, SubscriptionId, SubscriptionListFilter, SubscriptionStatus,
        SubscriptionUpdate,
    },
    infra::stripe_client::{StripeClient, StripeSubscription},
};

/// Adapter that wraps StripeClient to implement PaymentProviderPort.
#[derive(Clone)]
pub struct StripePaymentAdapter {
    client: StripeClient,
}

impl StripePaymentAdapter {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: StripeClient::new(secret_key),
        }
    }

    fn map_status(status: &str) -> AppResult<SubscriptionStatus> {
        let mapped = match status {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" => SubscriptionStatus::PastDue,
            "canceled" => SubscriptionStatus::Canceled,
            "incomplete" => SubscriptionStatus::Incomplete,
            "incomplete_expired" => SubscriptionStatus::IncompleteExpired,
            "unpaid" => SubscriptionStatus::Unpaid,
            "paused" => SubscriptionStatus::Paused,
            other => {
                return Err(AppError::Provider(format!(
                    "Unknown subscription status: {}",
                    other
                )));
            }
        };
        Ok(mapped)
    }

    fn map_subscription(sub: StripeSubscription) -> AppResult<Subscription> {
        Ok(Subscription {
            id: SubscriptionId::new(sub.id),
            customer: CustomerId::new(sub.customer),
            status: Self::map_status(&sub.status)?,
            created: sub.created,
            trial_start: sub.trial_start,
            trial_end: sub.trial_end,
            cancel_at: sub.cancel_at,
            metadata: sub.metadata,
        })
    }
}

#[async_trait]
impl PaymentProviderPort for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession> {
        let metadata = HashMap::from([("trial".to_string(), request.trial.as_str().to_string())]);

        let session = self
            .client
            .create_checkout_session(
                request.customer.as_str(),
                &request.plan,
                &request.success_url,
                &request.cancel_url,
                request.trial_end,
                &metadata,
            )
            .await?;

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn retrieve_customer(&self, customer_id: &CustomerId) -> AppResult<Customer> {
        let customer = self.client.get_customer(customer_id.as_str()).await?;

        let subscriptions = customer
            .subscriptions
            .map(|list| list.data)
            .unwrap_or_default()
            .into_iter()
            .map(Self::map_subscription)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Customer {
            id: CustomerId::new(customer.id),
            subscriptions,
        })
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<Subscription> {
        let sub = self
            .client
            .get_subscription(subscription_id.as_str())
            .await?;
        Self::map_subscription(sub)
    }

    async fn list_subscriptions(
        &self,
        filter: &SubscriptionListFilter,
    ) -> AppResult<Vec<Subscription>> {
        let subs = self
            .client
            .list_subscriptions(
                filter.customer.as_str(),
                filter.status.map(|s| s.as_str()),
                filter.created_before,
            )
            .await?;

        subs.into_iter().map(Self::map_subscription).collect()
    }

    async fn update_subscription(
        &self,
        subscription_id: &SubscriptionId,
        update: &SubscriptionUpdate,
    ) -> AppResult<Subscription> {
        let sub = self
            .client
            .update_subscription(subscription_id.as_str(), update.cancel_at)
            .await?;
        Self::map_subscription(sub)
    }

    async fn cancel_subscription(&self, subscription_id: &SubscriptionId) -> AppResult<()> {
        self.client
            .cancel_subscription(subscription_id.as_str())
            .await?;
        Ok(())
    }
}
