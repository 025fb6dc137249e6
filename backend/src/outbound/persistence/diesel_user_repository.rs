//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, SubscriptionState, SubscriptionStatus, User, UserDetails, UserId, UserName,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, SubscriptionUpdate, UserDetailsUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row into a domain user.
///
/// Rows are written only through validated details, so a row failing
/// validation means the table was modified out of band.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let details = UserName::new(row.name)
        .and_then(|name| EmailAddress::new(row.email).map(|email| UserDetails::new(name, email)))
        .map_err(|err| {
            warn!(user_id = row.id, error = %err, "stored user failed validation");
            UserPersistenceError::query(format!("stored user {} is invalid: {err}", row.id))
        })?;

    let subscription = SubscriptionState {
        customer_ref: row.stripe_customer_id,
        subscription_ref: row.stripe_subscription_id,
        status: SubscriptionStatus::from(row.subscription_status.as_str()),
        current_period_end: row.subscription_current_period_end,
    };
    Ok(User::new(UserId::new(row.id), details, subscription))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, details: &UserDetails) -> Result<UserId, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            name: details.name().as_ref(),
            email: details.email().as_ref(),
        };
        let id: i64 = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(users::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(UserId::new(id))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_i64())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_customer_ref(
        &self,
        customer_ref: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::stripe_customer_id.eq(customer_ref))
            .order(users::id.asc())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update(
        &self,
        id: UserId,
        details: &UserDetails,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserDetailsUpdate {
            name: details.name().as_ref(),
            email: details.email().as_ref(),
        };
        diesel::update(users::table.find(id.as_i64()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_subscription(
        &self,
        id: UserId,
        subscription: &SubscriptionState,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = SubscriptionUpdate {
            stripe_customer_id: subscription.customer_ref.as_deref(),
            stripe_subscription_id: subscription.subscription_ref.as_deref(),
            subscription_status: subscription.status.as_str(),
            subscription_current_period_end: subscription.current_period_end,
        };
        diesel::update(users::table.find(id.as_i64()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(users::table.find(id.as_i64()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
