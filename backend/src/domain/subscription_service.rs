//! Subscription workflow on top of [`UserService`].
//!
//! The local record never infers subscription state; it mirrors whatever the
//! provider reports through checkout completion and subscription webhooks.

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    PaymentProvider, PaymentProviderError, SubscriptionCommand, UserRepository,
};
use crate::domain::user_service::{map_persistence_error, UserService};
use crate::domain::{
    CheckoutRequest, CheckoutSession, Error, ProviderEvent, SubscriptionSnapshot,
    SubscriptionState, User, UserId,
};

fn map_provider_error(error: PaymentProviderError) -> Error {
    error!(%error, "payment provider failure");
    Error::internal(format!("payment provider error: {error}"))
}

fn map_webhook_error(error: PaymentProviderError) -> Error {
    match error {
        PaymentProviderError::SignatureInvalid { message } => {
            warn!(reason = %message, "webhook verification failed");
            Error::invalid_request("webhook signature verification failed")
                .with_details(json!({ "code": "webhook_verification_failed" }))
        }
        other => map_provider_error(other),
    }
}

fn subscription_already_active(id: UserId) -> Error {
    Error::conflict("subscription already active").with_details(json!({
        "code": "subscription_already_active",
        "id": id.as_i64(),
    }))
}

/// Idempotency key for the customer created on behalf of a user.
fn customer_idempotency_key(id: UserId) -> String {
    format!("customer-user-{id}")
}

impl<R: ?Sized, P: ?Sized> UserService<R, P>
where
    R: UserRepository,
    P: PaymentProvider,
{
    /// Create a remote customer and persist its reference before continuing.
    ///
    /// Not atomic: if persisting fails after the remote call succeeded the
    /// next attempt repeats the creation with the same idempotency key.
    async fn provision_customer(&self, user: &User) -> Result<String, Error> {
        let customer_ref = self
            .payments
            .create_customer(
                user.name().as_ref(),
                user.email().as_ref(),
                &customer_idempotency_key(user.id()),
            )
            .await
            .map_err(map_provider_error)?;

        let state = SubscriptionState {
            customer_ref: Some(customer_ref.clone()),
            ..user.subscription().clone()
        };
        self.users
            .update_subscription(user.id(), &state)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %user.id(), customer_ref = %customer_ref, "payment customer linked");
        Ok(customer_ref)
    }

    async fn mirror_subscription(
        &self,
        customer_ref: &str,
        snapshot: &SubscriptionSnapshot,
    ) -> Result<(), Error> {
        let Some(user) = self
            .users
            .find_by_customer_ref(customer_ref)
            .await
            .map_err(map_persistence_error)?
        else {
            info!(customer_ref, subscription_ref = %snapshot.id, "no local user for customer");
            return Ok(());
        };

        let state = SubscriptionState {
            customer_ref: user
                .subscription()
                .customer_ref
                .clone()
                .or_else(|| Some(customer_ref.to_owned())),
            subscription_ref: Some(snapshot.id.clone()),
            status: snapshot.status.clone(),
            current_period_end: snapshot.current_period_end,
        };
        self.users
            .update_subscription(user.id(), &state)
            .await
            .map_err(map_persistence_error)?;
        info!(
            user_id = %user.id(),
            status = %state.status,
            "subscription state mirrored"
        );
        Ok(())
    }

    async fn apply_checkout_completed(
        &self,
        customer_ref: Option<String>,
        subscription_ref: Option<String>,
    ) -> Result<(), Error> {
        let Some(subscription_ref) = subscription_ref else {
            info!("completed checkout carries no subscription");
            return Ok(());
        };
        let snapshot = self
            .payments
            .fetch_subscription(&subscription_ref)
            .await
            .map_err(map_provider_error)?;
        let customer_ref = customer_ref.unwrap_or_else(|| snapshot.customer_ref.clone());
        self.mirror_subscription(&customer_ref, &snapshot).await
    }
}

#[async_trait]
impl<R: ?Sized, P: ?Sized> SubscriptionCommand for UserService<R, P>
where
    R: UserRepository,
    P: PaymentProvider,
{
    async fn create_checkout_session(&self, user_id: UserId) -> Result<CheckoutSession, Error> {
        let user = self.fetch_existing(user_id).await?;
        if user.subscription().status.is_active() {
            return Err(subscription_already_active(user_id));
        }

        let customer_ref = match user.subscription().customer_ref.clone() {
            Some(existing) => existing,
            None => self.provision_customer(&user).await?,
        };

        let request = CheckoutRequest {
            customer_ref,
            price_id: self.checkout.price_id.clone(),
            quantity: 1,
            success_url: self.checkout.success_url.clone(),
            cancel_url: self.checkout.cancel_url.clone(),
        };
        let session = self
            .payments
            .create_checkout_session(&request)
            .await
            .map_err(map_provider_error)?;
        info!(user_id = %user_id, session_id = %session.id, "checkout session created");
        Ok(session)
    }

    async fn handle_provider_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<(), Error> {
        let event = self
            .payments
            .verify_webhook(payload, signature)
            .map_err(map_webhook_error)?;
        info!(event_type = event.event_type(), "provider webhook received");

        match event {
            ProviderEvent::CheckoutCompleted {
                customer_ref,
                subscription_ref,
            } => {
                self.apply_checkout_completed(customer_ref, subscription_ref)
                    .await
            }
            ProviderEvent::SubscriptionUpdated(snapshot)
            | ProviderEvent::SubscriptionDeleted(snapshot) => {
                self.mirror_subscription(&snapshot.customer_ref, &snapshot)
                    .await
            }
            ProviderEvent::Unrecognized { event_type } => {
                info!(%event_type, "ignoring unhandled webhook event");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "subscription_service_tests.rs"]
mod tests;
