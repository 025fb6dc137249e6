//! Driving port for user writes.

use async_trait::async_trait;

use crate::domain::{Error, UserDraft, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and store a new user.
    async fn create_user(&self, draft: UserDraft) -> Result<UserId, Error>;

    /// Validate and overwrite name and email of an existing user.
    async fn update_user(&self, id: UserId, draft: UserDraft) -> Result<(), Error>;

    /// Delete an existing user.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}
