use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_error::AppResult;

// ============================================================================
// Port Types - Provider-agnostic domain types
// ============================================================================

/// Unique identifier for a customer in the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a subscription in the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provenance tag stored in subscription metadata under the `trial` key.
///
/// `Auto` marks a system-initiated trial subscription; `Full` marks a
/// customer-initiated post-trial subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialTag {
    Auto,
    Full,
}

impl TrialTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialTag::Auto => "auto",
            TrialTag::Full => "full",
        }
    }

    pub fn from_metadata(metadata: &HashMap<String, String>) -> Option<Self> {
        match metadata.get("trial").map(String::as_str) {
            Some("auto") => Some(TrialTag::Auto),
            Some("full") => Some(TrialTag::Full),
            _ => None,
        }
    }
}

/// Subscription lifecycle status as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
        }
    }
}

/// Subscription state held by the payment provider.
///
/// Timestamps are Unix seconds, matching the provider's wire format.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub customer: CustomerId,
    pub status: SubscriptionStatus,
    pub created: i64,
    pub trial_start: Option<i64>,
    pub trial_end: Option<i64>,
    pub cancel_at: Option<i64>,
    pub metadata: HashMap<String, String>,
}

impl Subscription {
    pub fn trial_tag(&self) -> Option<TrialTag> {
        TrialTag::from_metadata(&self.metadata)
    }
}

/// Customer with its embedded subscription list
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub subscriptions: Vec<Subscription>,
}

/// Request to create a provider-hosted checkout session
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionRequest {
    pub customer: CustomerId,
    /// Provider-side plan (price) identifier
    pub plan: String,
    /// Unix seconds; omitted means the new subscription starts without a trial
    pub trial_end: Option<i64>,
    pub trial: TrialTag,
    pub success_url: String,
    pub cancel_url: String,
}

/// Provider-created checkout session; only the id is surfaced to callers
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Filter for listing a customer's subscriptions
#[derive(Debug, Clone)]
pub struct SubscriptionListFilter {
    pub customer: CustomerId,
    pub status: Option<SubscriptionStatus>,
    /// Keep only subscriptions with `created` strictly below this value
    pub created_before: Option<i64>,
}

/// Mutable subscription fields this service touches
#[derive(Debug, Clone, Default)]
pub struct SubscriptionUpdate {
    /// Unix seconds at which the provider should cancel the subscription
    pub cancel_at: Option<i64>,
}

// ============================================================================
// Payment Provider Port
// ============================================================================

/// Payment provider port - abstracts the external payment API.
///
/// Production binds this to the Stripe REST client; tests bind it to an
/// in-memory fake so the handlers are independently testable.
#[async_trait]
pub trait PaymentProviderPort: Send + Sync {
    /// Create a checkout session for a new subscription.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession>;

    /// Retrieve a customer together with its embedded subscriptions.
    async fn retrieve_customer(&self, customer_id: &CustomerId) -> AppResult<Customer>;

    /// Retrieve a single subscription.
    async fn retrieve_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<Subscription>;

    /// List subscriptions matching the filter.
    async fn list_subscriptions(
        &self,
        filter: &SubscriptionListFilter,
    ) -> AppResult<Vec<Subscription>>;

    /// Update a subscription; used to schedule a future cancellation.
    async fn update_subscription(
        &self,
        subscription_id: &SubscriptionId,
        update: &SubscriptionUpdate,
    ) -> AppResult<Subscription>;

    /// Cancel a subscription immediately.
    async fn cancel_subscription(&self, subscription_id: &SubscriptionId) -> AppResult<()>;
}
