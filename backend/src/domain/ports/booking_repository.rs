//! Port for the bookings API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{BookingRecord, CancellationReason, IdempotencyKey, StoredBooking, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// The bookings API could not be reached.
        Transport { message: String } => "bookings api transport failed: {message}",
        /// The bookings API did not answer in time.
        Timeout { message: String } => "bookings api timed out: {message}",
        /// No booking has the given reference.
        NotFound { message: String } => "booking not found: {message}",
        /// The idempotency key was already used for a different booking.
        Conflict { message: String } => "booking conflicts with an earlier write: {message}",
        /// The bookings API refused the request.
        Rejected { status: u16, message: String } =>
            "bookings api rejected the request ({status}): {message}",
        /// The bookings API answered with an unexpected body.
        Decode { message: String } => "bookings api response could not be decoded: {message}",
    }
}

/// Acknowledgement of a saved booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBooking {
    /// Reference the API stored the booking under.
    pub booking_reference: String,
}

/// Persistence of travel bookings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Save `record`. Repeating a call with the same `key` must not create a
    /// second booking.
    async fn create(
        &self,
        record: &BookingRecord,
        key: &IdempotencyKey,
    ) -> Result<CreatedBooking, BookingRepositoryError>;

    /// Cancel the booking stored under `reference`.
    async fn cancel(
        &self,
        reference: &str,
        reason: CancellationReason,
    ) -> Result<StoredBooking, BookingRepositoryError>;

    /// Bookings whose passenger e-mail is `email`.
    async fn list_by_email(&self, email: &str) -> Result<Vec<StoredBooking>, BookingRepositoryError>;

    /// Bookings owned by account `user`.
    async fn list_by_user(&self, user: UserId) -> Result<Vec<StoredBooking>, BookingRepositoryError>;
}

/// Fixture repository that accepts writes and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingRepository;

#[async_trait]
impl BookingRepository for FixtureBookingRepository {
    async fn create(
        &self,
        record: &BookingRecord,
        _key: &IdempotencyKey,
    ) -> Result<CreatedBooking, BookingRepositoryError> {
        Ok(CreatedBooking {
            booking_reference: record.booking_reference.to_string(),
        })
    }

    async fn cancel(
        &self,
        reference: &str,
        _reason: CancellationReason,
    ) -> Result<StoredBooking, BookingRepositoryError> {
        Err(BookingRepositoryError::not_found(reference))
    }

    async fn list_by_email(&self, _email: &str) -> Result<Vec<StoredBooking>, BookingRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_by_user(&self, _user: UserId) -> Result<Vec<StoredBooking>, BookingRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[tokio::test]
    async fn fixture_repository_has_no_bookings() {
        let repo = FixtureBookingRepository;
        assert!(repo.list_by_email("a@example.com").await.expect("list").is_empty());
        assert!(repo.list_by_user(UserId::new(7)).await.expect("list").is_empty());
        let err = repo
            .cancel("BK1", CancellationReason::default())
            .await
            .expect_err("nothing to cancel");
        assert_eq!(err.kind(), "NotFound");
    }
}
