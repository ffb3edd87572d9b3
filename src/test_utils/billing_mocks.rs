//! In-memory mock implementation of the payment provider port.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CheckoutSession, CheckoutSessionRequest, Customer, CustomerId, PaymentProviderPort,
        Subscription, SubscriptionId, SubscriptionListFilter, SubscriptionUpdate,
    },
};

/// Records every provider call so tests can assert on exactly what was sent.
#[derive(Default)]
pub struct InMemoryPaymentProvider {
    pub subscriptions: Mutex<HashMap<SubscriptionId, Subscription>>,
    pub created_sessions: Mutex<Vec<CheckoutSessionRequest>>,
    pub subscription_updates: Mutex<Vec<(SubscriptionId, SubscriptionUpdate)>>,
    pub canceled: Mutex<Vec<SubscriptionId>>,
    pub list_filters: Mutex<Vec<SubscriptionListFilter>>,
    failing_cancellations: Mutex<HashSet<SubscriptionId>>,
    session_counter: Mutex<u64>,
}

impl InMemoryPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_subscription(&self, subscription: Subscription) {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id.clone(), subscription);
    }

    /// Make `cancel_subscription` fail for the given id.
    pub fn fail_cancellation(&self, subscription_id: impl Into<String>) {
        self.failing_cancellations
            .lock()
            .unwrap()
            .insert(SubscriptionId::new(subscription_id));
    }
}

#[async_trait]
impl PaymentProviderPort for InMemoryPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession> {
        self.created_sessions.lock().unwrap().push(request.clone());

        let mut counter = self.session_counter.lock().unwrap();
        *counter += 1;

        Ok(CheckoutSession {
            id: format!("cs_test_{}", counter),
            url: None,
        })
    }

    async fn retrieve_customer(&self, customer_id: &CustomerId) -> AppResult<Customer> {
        let subscriptions = self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| &s.customer == customer_id)
            .cloned()
            .collect();

        Ok(Customer {
            id: customer_id.clone(),
            subscriptions,
        })
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(subscription_id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn list_subscriptions(
        &self,
        filter: &SubscriptionListFilter,
    ) -> AppResult<Vec<Subscription>> {
        self.list_filters.lock().unwrap().push(filter.clone());

        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.customer == filter.customer)
            .filter(|s| filter.status.is_none_or(|status| s.status == status))
            .filter(|s| filter.created_before.is_none_or(|bound| s.created < bound))
            .cloned()
            .collect())
    }

    async fn update_subscription(
        &self,
        subscription_id: &SubscriptionId,
        update: &SubscriptionUpdate,
    ) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions
            .get_mut(subscription_id)
            .ok_or(AppError::NotFound)?;

        subscription.cancel_at = update.cancel_at;

        self.subscription_updates
            .lock()
            .unwrap()
            .push((subscription_id.clone(), update.clone()));

        Ok(subscription.clone())
    }

    async fn cancel_subscription(&self, subscription_id: &SubscriptionId) -> AppResult<()> {
        if self
            .failing_cancellations
            .lock()
            .unwrap()
            .contains(subscription_id)
        {
            return Err(AppError::Provider("cancellation refused".into()));
        }

        self.subscriptions.lock().unwrap().remove(subscription_id);
        self.canceled.lock().unwrap().push(subscription_id.clone());
        Ok(())
    }
}
