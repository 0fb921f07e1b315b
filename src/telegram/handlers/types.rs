//! Handler types and dependencies

use std::sync::Arc;

use crate::telegram::relay::RelayContext;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub relay: Arc<RelayContext>,
    /// Telegram user ids allowed to submit links; empty allows everyone
    pub authorized_users: Arc<Vec<i64>>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(relay: Arc<RelayContext>, authorized_users: Vec<i64>) -> Self {
        Self {
            relay,
            authorized_users: Arc::new(authorized_users),
        }
    }
}
