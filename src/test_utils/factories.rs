//! Test data factories.

use std::collections::HashMap;

use crate::application::ports::payment_provider::{
    CustomerId, Subscription, SubscriptionId, SubscriptionStatus,
};

/// Build a subscription with sensible defaults, customized via the closure.
pub fn create_test_subscription(
    id: &str,
    customer: &str,
    customize: impl FnOnce(&mut Subscription),
) -> Subscription {
    let mut subscription = Subscription {
        id: SubscriptionId::new(id),
        customer: CustomerId::new(customer),
        status: SubscriptionStatus::Trialing,
        created: 0,
        trial_start: None,
        trial_end: None,
        cancel_at: None,
        metadata: HashMap::new(),
    };
    customize(&mut subscription);
    subscription
}
