//! Reconciliation of overlapping trial subscriptions after checkout completes.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CustomerId, PaymentProviderPort, SubscriptionId, SubscriptionListFilter,
        SubscriptionStatus, SubscriptionUpdate, TrialTag,
    },
};

/// Result of one cancellation in the stale-trial batch.
#[derive(Debug)]
pub struct CancellationOutcome {
    pub subscription_id: SubscriptionId,
    pub result: Result<(), AppError>,
}

/// What reconciliation did for a completed checkout.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Auto-trial subscription scheduled to cancel at its trial end
    pub scheduled: Option<SubscriptionId>,
    /// Stale trialing subscriptions the batch attempted to cancel
    pub cancellations: Vec<CancellationOutcome>,
}

pub struct WebhookUseCases {
    provider: Arc<dyn PaymentProviderPort>,
    customer_id: CustomerId,
}

impl WebhookUseCases {
    pub fn new(provider: Arc<dyn PaymentProviderPort>, customer_id: CustomerId) -> Self {
        Self {
            provider,
            customer_id,
        }
    }

    /// Reconcile trial subscriptions once a checkout has completed.
    ///
    /// An auto-trial subscription gets its cancellation scheduled at its own
    /// trial end; the provider tolerates repeat scheduling, so redelivered
    /// webhooks are harmless. Any other subscription triggers a sweep that
    /// cancels the customer's older trialing subscriptions.
    pub async fn handle_subscription_complete(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<ReconcileReport> {
        let subscription = self.provider.retrieve_subscription(subscription_id).await?;

        debug!(?subscription, "Retrieved subscription for reconciliation");

        if subscription.trial_tag() == Some(TrialTag::Auto) {
            self.provider
                .update_subscription(
                    &subscription.id,
                    &SubscriptionUpdate {
                        cancel_at: subscription.trial_end,
                    },
                )
                .await?;

            return Ok(ReconcileReport {
                scheduled: Some(subscription.id),
                cancellations: Vec::new(),
            });
        }

        // Trialing subscriptions created before the new one's trial start are
        // stale; without a trial start the whole trialing set is swept.
        let filter = SubscriptionListFilter {
            customer: self.customer_id.clone(),
            status: Some(SubscriptionStatus::Trialing),
            created_before: subscription.trial_start,
        };

        debug!(?filter, "Listing stale trialing subscriptions");

        let stale = self.provider.list_subscriptions(&filter).await?;

        let cancellations = join_all(stale.into_iter().map(|sub| {
            let provider = self.provider.clone();
            async move {
                debug!(subscription_id = %sub.id, "Cancelling stale subscription");
                let result = provider.cancel_subscription(&sub.id).await;
                CancellationOutcome {
                    subscription_id: sub.id,
                    result,
                }
            }
        }))
        .await;

        for outcome in &cancellations {
            if let Err(error) = &outcome.result {
                warn!(
                    subscription_id = %outcome.subscription_id,
                    %error,
                    "Failed to cancel stale subscription"
                );
            }
        }

        Ok(ReconcileReport {
            scheduled: None,
            cancellations,
        })
    }
}
