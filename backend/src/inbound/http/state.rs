//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be tested with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{SubscriptionCommand, UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users_query: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub subscriptions: Arc<dyn SubscriptionCommand>,
}

impl HttpState {
    /// Bundle the driving ports for `web::Data`.
    pub fn new(
        users_query: Arc<dyn UsersQuery>,
        users_command: Arc<dyn UsersCommand>,
        subscriptions: Arc<dyn SubscriptionCommand>,
    ) -> Self {
        Self {
            users_query,
            users_command,
            subscriptions,
        }
    }
}
