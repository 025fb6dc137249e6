//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod payment_provider;
mod request_telemetry;
mod subscription_command;
mod user_repository;
mod users_command;
mod users_query;

#[cfg(test)]
pub use payment_provider::MockPaymentProvider;
pub use payment_provider::{FixturePaymentProvider, PaymentProvider, PaymentProviderError};
#[cfg(test)]
pub use request_telemetry::MockRequestTelemetry;
pub use request_telemetry::{
    NoOpRequestTelemetry, RequestSample, RequestTelemetry, RequestTelemetryError,
};
#[cfg(test)]
pub use subscription_command::MockSubscriptionCommand;
pub use subscription_command::SubscriptionCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::UsersCommand;
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
