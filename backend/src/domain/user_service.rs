//! User management domain service.
//!
//! Implements the user driving ports on top of a [`UserRepository`]. All
//! field validation happens here, before any repository call, and a missing
//! row is turned into a not-found error in exactly one place
//! ([`UserService::fetch_existing`]).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    PaymentProvider, UserPersistenceError, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{
    CheckoutSettings, Error, User, UserDetails, UserDraft, UserId, UserValidationError,
};

/// Domain service coordinating user records and their subscriptions.
///
/// The subscription workflow lives in `subscription_service.rs`.
#[derive(Clone)]
pub struct UserService<R: ?Sized, P: ?Sized> {
    pub(super) users: Arc<R>,
    pub(super) payments: Arc<P>,
    pub(super) checkout: CheckoutSettings,
}

impl<R: ?Sized, P: ?Sized> UserService<R, P> {
    /// Create a new service from its adapters and checkout settings.
    pub fn new(users: Arc<R>, payments: Arc<P>, checkout: CheckoutSettings) -> Self {
        Self {
            users,
            payments,
            checkout,
        }
    }
}

pub(super) fn map_persistence_error(error: UserPersistenceError) -> Error {
    error!(%error, "user repository failure");
    match error {
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_validation_error(error: UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}

pub(super) fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found")).with_details(json!({
        "code": "user_not_found",
        "id": id.as_i64(),
    }))
}

impl<R: ?Sized, P: ?Sized> UserService<R, P>
where
    R: UserRepository,
    P: PaymentProvider,
{
    pub(super) async fn fetch_existing(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| user_not_found(id))
    }
}

#[async_trait]
impl<R: ?Sized, P: ?Sized> UsersQuery for UserService<R, P>
where
    R: UserRepository,
    P: PaymentProvider,
{
    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.fetch_existing(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_persistence_error)
    }
}

#[async_trait]
impl<R: ?Sized, P: ?Sized> UsersCommand for UserService<R, P>
where
    R: UserRepository,
    P: PaymentProvider,
{
    async fn create_user(&self, draft: UserDraft) -> Result<UserId, Error> {
        let details = UserDetails::try_from(draft).map_err(map_validation_error)?;
        let id = self
            .users
            .create(&details)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %id, "user created");
        Ok(id)
    }

    async fn update_user(&self, id: UserId, draft: UserDraft) -> Result<(), Error> {
        let details = UserDetails::try_from(draft).map_err(map_validation_error)?;
        self.fetch_existing(id).await?;
        self.users
            .update(id, &details)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %id, "user updated");
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        self.fetch_existing(id).await?;
        self.users.delete(id).await.map_err(map_persistence_error)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
