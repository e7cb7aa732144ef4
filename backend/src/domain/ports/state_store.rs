//! Port for loading and saving a user's dashboard state.
//!
//! The remote store is a key-value endpoint keyed by user id. Saves replace
//! the whole document, so concurrent writers resolve as last write wins.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DashboardState, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by state store adapters.
    pub enum StateStoreError {
        /// The store could not be reached.
        Transport { message: String } => "state store transport failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } => "state store timed out: {message}",
        /// The store refused the request.
        Rejected { status: u16, message: String } =>
            "state store rejected the request ({status}): {message}",
        /// The store answered with a body that is not JSON.
        Decode { message: String } => "state store response was not JSON: {message}",
    }
}

/// Remote persistence for [`DashboardState`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the raw persisted state for `user`.
    ///
    /// The value is returned untyped because stored documents may use any
    /// historical shape; callers pass it through
    /// [`migrate_state`](crate::domain::migrate_state). `Value::Null` means
    /// nothing has been saved yet.
    async fn load(&self, user: UserId) -> Result<Value, StateStoreError>;

    /// Replace the stored state for `user`.
    async fn save(&self, user: UserId, state: &DashboardState) -> Result<(), StateStoreError>;
}

/// Fixture store that has nothing saved and discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStateStore;

#[async_trait]
impl StateStore for FixtureStateStore {
    async fn load(&self, _user: UserId) -> Result<Value, StateStoreError> {
        Ok(Value::Null)
    }

    async fn save(&self, _user: UserId, _state: &DashboardState) -> Result<(), StateStoreError> {
        Ok(())
    }
}
