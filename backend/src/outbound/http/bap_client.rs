//! Reqwest-backed client for the BAP service.
//!
//! Beckn envelopes are forwarded as JSON and the acknowledgement is returned
//! untouched. Booking writes carry an `Idempotency-Key` header so a retried
//! save does not store the booking twice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info};

use super::dto::{BookingDto, BookingListDto, CancelBookingBody, CreatedBookingDto};
use super::error::{endpoint, map_transport_error, read_json};
use crate::domain::ports::{
    BecknGateway, BecknGatewayError, BookingRepository, BookingRepositoryError, CreatedBooking,
};
use crate::domain::{
    BecknAction, BecknEnvelope, BookingRecord, CancellationReason, IDEMPOTENCY_KEY_HEADER,
    IdempotencyKey, StoredBooking, UserId,
};

/// Client for the BAP service rooted at one base URL.
#[derive(Debug, Clone)]
pub struct BapClient {
    client: Client,
    base: Url,
}

impl BapClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    async fn forward(
        &self,
        action: BecknAction,
        request: &BecknEnvelope,
    ) -> Result<Value, BecknGatewayError> {
        let url = endpoint::<BecknGatewayError>(&self.base, &["beckn", action.as_str()])?;
        debug!(
            action = %action,
            transaction_id = %request.transaction_id(),
            message_id = %request.message_id(),
            "forwarding beckn request"
        );
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error::<BecknGatewayError>)?;
        read_json(response).await
    }

    async fn list(&self, segments: &[&str]) -> Result<Vec<StoredBooking>, BookingRepositoryError> {
        let url = endpoint::<BookingRepositoryError>(&self.base, segments)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error::<BookingRepositoryError>)?;
        let listed: BookingListDto = read_json::<_, BookingRepositoryError>(response).await?;
        Ok(listed.bookings)
    }
}

#[async_trait]
impl BecknGateway for BapClient {
    async fn select(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError> {
        self.forward(BecknAction::Select, request).await
    }

    async fn confirm(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError> {
        self.forward(BecknAction::Confirm, request).await
    }

    async fn status(&self, request: &BecknEnvelope) -> Result<Value, BecknGatewayError> {
        self.forward(BecknAction::Status, request).await
    }
}

#[async_trait]
impl BookingRepository for BapClient {
    async fn create(
        &self,
        record: &BookingRecord,
        key: &IdempotencyKey,
    ) -> Result<CreatedBooking, BookingRepositoryError> {
        let url = endpoint::<BookingRepositoryError>(&self.base, &["api", "bookings"])?;
        let response = self
            .client
            .post(url)
            .header(IDEMPOTENCY_KEY_HEADER, key.to_string())
            .json(record)
            .send()
            .await
            .map_err(map_transport_error::<BookingRepositoryError>)?;
        let created: CreatedBookingDto = read_json::<_, BookingRepositoryError>(response).await?;
        info!(
            booking_reference = %created.booking.booking_reference,
            idempotency_key = %key,
            "booking saved"
        );
        Ok(created.booking)
    }

    async fn cancel(
        &self,
        reference: &str,
        reason: CancellationReason,
    ) -> Result<StoredBooking, BookingRepositoryError> {
        let url = endpoint::<BookingRepositoryError>(
            &self.base,
            &["api", "bookings", reference, "cancel"],
        )?;
        let response = self
            .client
            .patch(url)
            .json(&CancelBookingBody {
                reason_id: reason.id(),
                reason: reason.description(),
            })
            .send()
            .await
            .map_err(map_transport_error::<BookingRepositoryError>)?;
        let cancelled: BookingDto = read_json::<_, BookingRepositoryError>(response).await?;
        Ok(cancelled.booking)
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<StoredBooking>, BookingRepositoryError> {
        self.list(&["api", "bookings", "email", email]).await
    }

    async fn list_by_user(&self, user: UserId) -> Result<Vec<StoredBooking>, BookingRepositoryError> {
        let id = user.to_string();
        self.list(&["api", "bookings", "user", &id]).await
    }
}
