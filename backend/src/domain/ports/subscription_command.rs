//! Driving port for the subscription workflow.

use async_trait::async_trait;

use crate::domain::{CheckoutSession, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionCommand: Send + Sync {
    /// Start a hosted checkout for the user's subscription.
    async fn create_checkout_session(&self, user_id: UserId) -> Result<CheckoutSession, Error>;

    /// Verify and apply a provider webhook.
    async fn handle_provider_webhook(&self, payload: &[u8], signature: &str)
    -> Result<(), Error>;
}
