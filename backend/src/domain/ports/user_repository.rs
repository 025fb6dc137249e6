//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{SubscriptionState, User, UserDetails, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Storage for user records.
///
/// Lookups report a missing row as `Ok(None)`; deciding whether absence is an
/// error belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with default subscription fields and return the
    /// store-assigned identifier.
    async fn create(&self, details: &UserDetails) -> Result<UserId, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the user linked to a provider customer reference.
    async fn find_by_customer_ref(
        &self,
        customer_ref: &str,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Return every user ordered by ascending identifier.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Overwrite name and email only.
    async fn update(&self, id: UserId, details: &UserDetails)
    -> Result<(), UserPersistenceError>;

    /// Overwrite the four subscription fields only.
    async fn update_subscription(
        &self,
        id: UserId,
        subscription: &SubscriptionState,
    ) -> Result<(), UserPersistenceError>;

    /// Remove a user.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;
}

/// Repository used when no database is configured. Always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, _details: &UserDetails) -> Result<UserId, UserPersistenceError> {
        Err(UserPersistenceError::connection("no database configured"))
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_customer_ref(
        &self,
        _customer_ref: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(Vec::new())
    }

    async fn update(
        &self,
        _id: UserId,
        _details: &UserDetails,
    ) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn update_subscription(
        &self,
        _id: UserId,
        _subscription: &SubscriptionState,
    ) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn delete(&self, _id: UserId) -> Result<(), UserPersistenceError> {
        Ok(())
    }
}
