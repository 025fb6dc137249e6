//! Payment provider vocabulary shared by the subscription workflow and its
//! adapters.

use chrono::{DateTime, Utc};

use super::SubscriptionStatus;

/// Fixed checkout parameters configured at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Recurring price identifier charged by every checkout.
    pub price_id: String,
    /// Redirect target after a completed checkout. May contain the
    /// provider's `{CHECKOUT_SESSION_ID}` placeholder.
    pub success_url: String,
    /// Redirect target after an abandoned checkout.
    pub cancel_url: String,
}

/// Parameters for a subscription-mode checkout with a single line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Provider customer the session is opened for.
    pub customer_ref: String,
    /// Recurring price of the single line item.
    pub price_id: String,
    /// Line item quantity; always 1 for this service.
    pub quantity: u32,
    /// Redirect after payment; may carry the `{CHECKOUT_SESSION_ID}` placeholder.
    pub success_url: String,
    /// Redirect after an abandoned checkout.
    pub cancel_url: String,
}

/// Checkout session created by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Provider session reference.
    pub id: String,
    /// Hosted payment page the caller should be redirected to.
    pub url: String,
}

/// Subscription as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    /// Provider subscription reference.
    pub id: String,
    /// Customer the subscription belongs to.
    pub customer_ref: String,
    /// Status as reported, unknown values included.
    pub status: SubscriptionStatus,
    /// End of the current billing period, when reported.
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Verified webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A checkout finished; the subscription detail must be fetched.
    CheckoutCompleted {
        customer_ref: Option<String>,
        subscription_ref: Option<String>,
    },
    SubscriptionUpdated(SubscriptionSnapshot),
    SubscriptionDeleted(SubscriptionSnapshot),
    /// Any event type the workflow does not act on.
    Unrecognized { event_type: String },
}

impl ProviderEvent {
    /// Provider event type tag, for logging.
    pub fn event_type(&self) -> &str {
        match self {
            Self::CheckoutCompleted { .. } => "checkout.session.completed",
            Self::SubscriptionUpdated(_) => "customer.subscription.updated",
            Self::SubscriptionDeleted(_) => "customer.subscription.deleted",
            Self::Unrecognized { event_type } => event_type.as_str(),
        }
    }
}
