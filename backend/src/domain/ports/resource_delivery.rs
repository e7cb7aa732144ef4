//! Port for delivering a recommendation to another account.

use async_trait::async_trait;

use crate::domain::{SharedResource, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by resource delivery adapters.
    pub enum ResourceDeliveryError {
        /// The delivery service could not be reached.
        Transport { message: String } => "resource delivery transport failed: {message}",
        /// The delivery service did not answer in time.
        Timeout { message: String } => "resource delivery timed out: {message}",
        /// The receiving account refused or does not exist.
        Rejected { status: u16, message: String } =>
            "resource delivery rejected ({status}): {message}",
    }
}

/// Cross-account delivery of recommendations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceDelivery: Send + Sync {
    /// Deliver `resource` from `sender` to `receiver`.
    async fn recommend(
        &self,
        sender: UserId,
        receiver: UserId,
        resource: &SharedResource,
    ) -> Result<(), ResourceDeliveryError>;
}

/// Fixture delivery that accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureResourceDelivery;

#[async_trait]
impl ResourceDelivery for FixtureResourceDelivery {
    async fn recommend(
        &self,
        _sender: UserId,
        _receiver: UserId,
        _resource: &SharedResource,
    ) -> Result<(), ResourceDeliveryError> {
        Ok(())
    }
}
