//! Checkout: pay, confirm with the Beckn network, and record the booking.
//!
//! Payment is never rolled back. Once it succeeds, a failed Beckn confirm is
//! reported as an error carrying the payment transaction id, and a failed
//! booking save is reported in the outcome rather than failing the checkout,
//! so a paid traveller always learns what happened to their money.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::ports::{BecknGateway, BecknGatewayError, BookingRepository};
use super::{
    BapIdentity, BecknTrace, BookingExtractor, BookingInput, BookingRecord, BookingReference,
    BookingType, ConfirmOrder, Error, IdempotencyKey, PassengerForm, PaymentDetails,
    PaymentReceipt, PaymentSimulator, PaymentStatus, SearchContext, confirm_request,
};

/// Everything the traveller submitted on the checkout pages.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Travel mode.
    pub booking_type: BookingType,
    /// Item selected on the search page.
    pub item: Value,
    /// Traveller form as entered.
    pub passenger: PassengerForm,
    /// What the traveller searched for.
    pub search_context: Option<SearchContext>,
    /// Signed-in account id, loosely typed.
    pub user_id: Option<Value>,
    /// Signed-in account e-mail.
    pub user_email: Option<String>,
    /// Amount from the booking form, used when the item has no price.
    pub amount: Option<Value>,
    /// Payment method and its details.
    pub payment: PaymentDetails,
}

/// Whether the booking record reached the bookings API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BookingPersistence {
    /// Saved under `booking_reference`.
    Saved {
        /// Reference assigned by the bookings API.
        booking_reference: String,
    },
    /// The save failed; the booking exists only with the provider.
    Failed {
        /// Repository error text.
        reason: String,
    },
}

/// Result of a checkout whose payment and confirm succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    /// Simulated payment.
    pub receipt: PaymentReceipt,
    /// Flat record sent to the bookings API.
    pub record: BookingRecord,
    /// Raw Beckn confirm response.
    pub beckn_response: Value,
    /// Whether the record was saved.
    pub persistence: BookingPersistence,
    /// Reference to show the traveller: the stored booking reference, or the
    /// Beckn order id when the save failed.
    pub display_reference: String,
}

impl CheckoutOutcome {
    /// Whether the booking was saved.
    pub fn is_persisted(&self) -> bool {
        matches!(self.persistence, BookingPersistence::Saved { .. })
    }
}

/// Checkout service driving the payment, Beckn, and bookings collaborators.
#[derive(Clone)]
pub struct CheckoutService<G, B> {
    gateway: Arc<G>,
    bookings: Arc<B>,
    payments: PaymentSimulator,
    extractor: BookingExtractor,
    identity: BapIdentity,
    clock: Arc<dyn Clock>,
}

impl<G, B> CheckoutService<G, B> {
    /// Create a service using the built-in station table.
    pub fn new(
        gateway: Arc<G>,
        bookings: Arc<B>,
        payments: PaymentSimulator,
        identity: BapIdentity,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            bookings,
            payments,
            extractor: BookingExtractor::default(),
            identity,
            clock,
        }
    }

    /// Replace the booking extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: BookingExtractor) -> Self {
        self.extractor = extractor;
        self
    }
}

impl<G, B> CheckoutService<G, B>
where
    G: BecknGateway,
    B: BookingRepository,
{
    fn confirm_failed(receipt: &PaymentReceipt, error: &BecknGatewayError) -> Error {
        Error::service_unavailable("failed to confirm booking").with_details(json!({
            "transactionId": receipt.transaction_id,
            "reason": error.to_string(),
            "code": error.kind(),
        }))
    }

    fn booking_input(request: &CheckoutRequest, receipt: &PaymentReceipt) -> BookingInput {
        BookingInput {
            booking_type: request.booking_type,
            item: request.item.clone(),
            passenger: request.passenger.clone(),
            search_context: request.search_context.clone(),
            user_id: request.user_id.clone(),
            user_email: request.user_email.clone(),
            amount: request.amount.clone(),
            transaction_id: Some(receipt.transaction_id.clone()),
            payment_method: receipt.method,
            payment_status: PaymentStatus::Paid,
            beckn: None,
        }
    }

    /// Run a checkout.
    ///
    /// # Errors
    ///
    /// `payment_declined` when the payment details are invalid (nothing is
    /// charged), and `service_unavailable` when the Beckn confirm fails after
    /// payment.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome, Error> {
        let receipt = self.payments.pay(&request.payment).await?;
        let paid_at = receipt.paid_at;

        let input = Self::booking_input(request, &receipt);
        let mut record =
            self.extractor
                .extract(&input, BookingReference::generate(paid_at), paid_at);

        let mut passenger = request.passenger.resolve();
        passenger.email = record.passenger_email.clone();
        let envelope = confirm_request(
            &self.identity,
            &ConfirmOrder {
                booking_type: request.booking_type,
                item: &request.item,
                passenger: &passenger,
                payment_transaction_id: &receipt.transaction_id,
                amount: record.amount,
                currency: &record.currency,
            },
            self.clock.utc(),
        );

        let beckn_response = self.gateway.confirm(&envelope).await.map_err(|err| {
            error!(
                transaction_id = %receipt.transaction_id,
                kind = err.kind(),
                error = %err,
                "beckn confirm failed after payment"
            );
            Self::confirm_failed(&receipt, &err)
        })?;

        let order_id = envelope.order_id().unwrap_or_default().to_owned();
        record.attach_beckn(BecknTrace {
            transaction_id: envelope.transaction_id().to_owned(),
            message_id: envelope.message_id().to_owned(),
            order_id: order_id.clone(),
            response: beckn_response.clone(),
        });

        let key = IdempotencyKey::random();
        let persistence = match self.bookings.create(&record, &key).await {
            Ok(created) => {
                info!(
                    booking_reference = %created.booking_reference,
                    order_id = %order_id,
                    "booking saved"
                );
                BookingPersistence::Saved {
                    booking_reference: created.booking_reference,
                }
            }
            Err(err) => {
                warn!(
                    order_id = %order_id,
                    idempotency_key = %key,
                    kind = err.kind(),
                    error = %err,
                    "booking save failed after payment; keeping the confirmed order"
                );
                BookingPersistence::Failed {
                    reason: err.to_string(),
                }
            }
        };

        let display_reference = match &persistence {
            BookingPersistence::Saved { booking_reference } => booking_reference.clone(),
            BookingPersistence::Failed { .. } => order_id,
        };

        Ok(CheckoutOutcome {
            receipt,
            record,
            beckn_response,
            persistence,
            display_reference,
        })
    }
}

#[cfg(test)]
mod tests;
