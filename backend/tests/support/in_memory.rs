//! `UserRepository` kept in a map, mirroring the Diesel adapter's semantics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use subscriber_api::domain::ports::{UserPersistenceError, UserRepository};
use subscriber_api::domain::{SubscriptionState, User, UserDetails, UserId};

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<BTreeMap<i64, User>>,
    last_id: AtomicI64,
}

impl InMemoryUserRepository {
    fn rows(&self) -> MutexGuard<'_, BTreeMap<i64, User>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of a stored row, bypassing the service layer.
    pub fn stored(&self, id: i64) -> Option<User> {
        self.rows().get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, details: &UserDetails) -> Result<UserId, UserPersistenceError> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User::new(UserId::new(id), details.clone(), SubscriptionState::default());
        self.rows().insert(id, user);
        Ok(UserId::new(id))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.stored(id.as_i64()))
    }

    async fn find_by_customer_ref(
        &self,
        customer_ref: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .rows()
            .values()
            .find(|user| user.subscription().customer_ref.as_deref() == Some(customer_ref))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.rows().values().cloned().collect())
    }

    async fn update(&self, id: UserId, details: &UserDetails) -> Result<(), UserPersistenceError> {
        let mut rows = self.rows();
        if let Some(user) = rows.get_mut(&id.as_i64()) {
            *user = User::new(id, details.clone(), user.subscription().clone());
        }
        Ok(())
    }

    async fn update_subscription(
        &self,
        id: UserId,
        subscription: &SubscriptionState,
    ) -> Result<(), UserPersistenceError> {
        let mut rows = self.rows();
        if let Some(user) = rows.get_mut(&id.as_i64()) {
            *user = User::new(id, user.details().clone(), subscription.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        self.rows().remove(&id.as_i64());
        Ok(())
    }
}
