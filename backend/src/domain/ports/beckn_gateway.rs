//! Port for the Beckn buyer application (BAP) endpoints.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::BecknEnvelope;

use super::define_port_error;

define_port_error! {
    /// Errors raised by Beckn gateway adapters.
    pub enum BecknGatewayError {
        /// The BAP could not be reached.
        Transport { message: String } => "beckn gateway transport failed: {message}",
        /// The BAP did not answer in time.
        Timeout { message: String } => "beckn gateway timed out: {message}",
        /// The BAP refused the request.
        Rejected { status: u16, message: String } =>
            "beckn gateway rejected the request ({status}): {message}",
        /// The BAP answered with a body that is not JSON.
        Decode { message: String } => "beckn gateway response was not JSON: {message}",
    }
}

/// Forwarding of Beckn envelopes; responses are opaque.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BecknGateway: Send + Sync {
    /// Send a `select`.
    async fn select(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError>;

    /// Send a `confirm`.
    async fn confirm(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError>;

    /// Send a `status`.
    async fn status(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError>;
}

/// Fixture gateway that acknowledges every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBecknGateway;

fn ack(request: &BecknEnvelope) -> Value {
    json!({
        "context": {
            "action": format!("on_{}", request.action()),
            "transaction_id": request.transaction_id(),
            "message_id": request.message_id(),
        },
        "message": { "ack": { "status": "ACK" } }
    })
}

#[async_trait]
impl BecknGateway for FixtureBecknGateway {
    async fn select(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError> {
        Ok(ack(request))
    }

    async fn confirm(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError> {
        Ok(ack(request))
    }

    async fn status(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError> {
        Ok(ack(request))
    }
}
