//! HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

#[cfg(feature = "metrics")]
use prometheus::Registry;
use subscriber_api::middleware::timeout::DEFAULT_REQUEST_TIMEOUT;
use subscriber_api::outbound::persistence::DbPool;
use subscriber_api::settings::StripeSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) request_timeout: Duration,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) stripe: Option<StripeSettings>,
    #[cfg(feature = "metrics")]
    pub(crate) registry: Option<Registry>,
}

impl ServerConfig {
    /// Fixture adapters and the default timeout until configured otherwise.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            db_pool: None,
            stripe: None,
            #[cfg(feature = "metrics")]
            registry: None,
        }
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Attach a database pool; without one the user repository is a fixture.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach Stripe credentials; without them billing calls fail as
    /// unavailable and webhooks are rejected.
    #[must_use]
    pub fn with_stripe(mut self, stripe: Option<StripeSettings>) -> Self {
        self.stripe = stripe;
        self
    }

    /// Attach the registry backing `/metrics`.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }
}
