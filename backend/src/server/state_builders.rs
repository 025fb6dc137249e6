//! Builders selecting real adapters or fixtures for the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use subscriber_api::domain::ports::{
    FixturePaymentProvider, FixtureUserRepository, PaymentProvider, UserRepository,
};
use subscriber_api::domain::{CheckoutSettings, UserService};
use subscriber_api::inbound::http::state::HttpState;
use subscriber_api::outbound::persistence::{DbPool, DieselUserRepository};
use subscriber_api::outbound::stripe::{StripeClient, StripeConfig};
use subscriber_api::settings::StripeSettings;

use super::ServerConfig;

fn build_user_repository(pool: Option<&DbPool>) -> Arc<dyn UserRepository> {
    match pool {
        Some(pool) => Arc::new(DieselUserRepository::new(pool.clone())),
        None => {
            warn!("no database configured; user storage is unavailable");
            Arc::new(FixtureUserRepository)
        }
    }
}

/// Build the payment provider and checkout parameters.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the HTTP client cannot be constructed.
fn build_payment_provider(
    stripe: Option<&StripeSettings>,
) -> std::io::Result<(Arc<dyn PaymentProvider>, CheckoutSettings)> {
    match stripe {
        Some(settings) => {
            let client = StripeClient::new(StripeConfig {
                api_base: settings.api_base.clone(),
                secret_key: settings.secret_key.as_str().to_owned(),
                webhook_secret: settings.webhook_secret.as_str().to_owned(),
                timeout: settings.timeout,
            })
            .map_err(|err| std::io::Error::other(format!("Stripe client setup failed: {err}")))?;
            Ok((Arc::new(client), settings.checkout.clone()))
        }
        None => {
            warn!("Stripe is not configured; checkout and webhooks are disabled");
            Ok((
                Arc::new(FixturePaymentProvider),
                CheckoutSettings {
                    price_id: String::new(),
                    success_url: String::new(),
                    cancel_url: String::new(),
                },
            ))
        }
    }
}

/// Build the shared HTTP state from configured adapters and fixture fallbacks.
///
/// # Errors
///
/// Propagates adapter construction failures as [`std::io::Error`].
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let users = build_user_repository(config.db_pool.as_ref());
    let (payments, checkout) = build_payment_provider(config.stripe.as_ref())?;
    let service = Arc::new(UserService::new(users, payments, checkout));

    Ok(web::Data::new(HttpState::new(
        service.clone(),
        service.clone(),
        service,
    )))
}
