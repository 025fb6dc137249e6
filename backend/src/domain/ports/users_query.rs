//! Driving port for user reads.
//!
//! Inbound adapters use this port to fetch users without importing outbound
//! persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch one user; fails with a not-found error when absent.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// List every user ordered by identifier.
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}
