//! Regression coverage for this module.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::json;
use url::Url;

use super::*;
use crate::domain::ports::{
    BookingRepositoryError, CreatedBooking, MockBecknGateway, MockBookingRepository,
};
use crate::domain::{BookingStatus, CardDetails, ErrorCode, PaymentMethod, PaymentSleeper};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_767_225_600_123)
            .single()
            .expect("valid fixture timestamp")
    }
}

struct InstantSleeper;

#[async_trait]
impl PaymentSleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

fn valid_card() -> CardDetails {
    CardDetails {
        card_number: "4111 1111 1111 1111".to_owned(),
        card_holder: "Asha Rao".to_owned(),
        expiry_month: "08".to_owned(),
        expiry_year: "2028".to_owned(),
        cvv: "123".to_owned(),
    }
}

#[fixture]
fn request() -> CheckoutRequest {
    CheckoutRequest {
        booking_type: BookingType::Flight,
        item: json!({
            "id": "6E-201",
            "providerId": "indigo",
            "details": { "airline": "IndiGo", "origin": "BLR", "destination": "DEL" },
            "price": 4500
        }),
        passenger: PassengerForm {
            name: Some("Asha Rao".to_owned()),
            email: Some("form@example.com".to_owned()),
            ..PassengerForm::default()
        },
        search_context: None,
        user_id: Some(json!(42)),
        user_email: Some("asha@example.com".to_owned()),
        amount: None,
        payment: PaymentDetails::Card(valid_card()),
    }
}

fn service(
    gateway: MockBecknGateway,
    bookings: MockBookingRepository,
) -> CheckoutService<MockBecknGateway, MockBookingRepository> {
    let clock: Arc<dyn Clock> = Arc::new(FixtureClock);
    let payments = PaymentSimulator::with_sleeper(
        Duration::from_secs(3),
        Arc::clone(&clock),
        Arc::new(InstantSleeper),
    );
    let identity = BapIdentity::new(
        "travel-discovery-bap.example.com",
        Url::parse("http://localhost:8081").expect("valid url"),
    );
    CheckoutService::new(Arc::new(gateway), Arc::new(bookings), payments, identity, clock)
}

fn acking_gateway() -> MockBecknGateway {
    let mut gateway = MockBecknGateway::new();
    gateway
        .expect_confirm()
        .times(1)
        .returning(|_| Ok(json!({ "message": { "ack": { "status": "ACK" } } })));
    gateway
}

#[rstest]
#[tokio::test]
async fn successful_checkout_saves_the_confirmed_booking(request: CheckoutRequest) {
    let mut gateway = MockBecknGateway::new();
    gateway
        .expect_confirm()
        .withf(|envelope| {
            let value = serde_json::to_value(envelope).expect("envelope encodes");
            value["message"]["order"]["payment"]["params"]["amount"] == "4500"
                && value["message"]["order"]["billing"]["email"] == "asha@example.com"
                && value["message"]["order"]["provider"]["id"] == "indigo"
        })
        .times(1)
        .returning(|_| Ok(json!({ "message": { "ack": { "status": "ACK" } } })));
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_create()
        .withf(|record, _key| {
            record.order_id.as_deref() == Some("order-1767225600123")
                && record.transaction_id.as_deref() == Some("TXN1767225600123")
        })
        .times(1)
        .returning(|record, _| {
            Ok(CreatedBooking {
                booking_reference: record.booking_reference.to_string(),
            })
        });

    let outcome = service(gateway, bookings)
        .checkout(&request)
        .await
        .expect("checkout succeeds");

    assert!(outcome.is_persisted());
    assert_eq!(outcome.display_reference, outcome.record.booking_reference.as_str());
    assert_eq!(outcome.receipt.method, PaymentMethod::Card);
    assert_eq!(outcome.record.item_name.as_deref(), Some("IndiGo"));
    assert_eq!(outcome.record.payment_status, PaymentStatus::Paid);
    assert_eq!(outcome.record.booking_status, BookingStatus::Confirmed);
    assert_eq!(
        outcome.record.booking_metadata.beckn_response,
        Some(outcome.beckn_response.clone())
    );
}

#[rstest]
#[tokio::test]
async fn invalid_card_is_declined_before_any_call(mut request: CheckoutRequest) {
    let mut gateway = MockBecknGateway::new();
    gateway.expect_confirm().never();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_create().never();
    request.payment = PaymentDetails::Card(CardDetails {
        cvv: "12".to_owned(),
        ..valid_card()
    });

    let err = service(gateway, bookings)
        .checkout(&request)
        .await
        .expect_err("declined");

    assert_eq!(err.code(), ErrorCode::PaymentDeclined);
}

#[rstest]
#[tokio::test]
async fn confirm_failure_reports_the_paid_transaction(request: CheckoutRequest) {
    let mut gateway = MockBecknGateway::new();
    gateway
        .expect_confirm()
        .times(1)
        .returning(|_| Err(BecknGatewayError::transport("connection refused")));
    let mut bookings = MockBookingRepository::new();
    bookings.expect_create().never();

    let err = service(gateway, bookings)
        .checkout(&request)
        .await
        .expect_err("confirm fails");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(err.message(), "failed to confirm booking");
    let details = err.details().expect("details attached");
    assert_eq!(details["transactionId"], "TXN1767225600123");
}

#[rstest]
#[tokio::test]
async fn save_failure_keeps_the_checkout_successful(request: CheckoutRequest) {
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_create()
        .times(1)
        .returning(|_, _| Err(BookingRepositoryError::timeout("bookings api slow")));

    let outcome = service(acking_gateway(), bookings)
        .checkout(&request)
        .await
        .expect("checkout still succeeds");

    assert!(!outcome.is_persisted());
    assert_eq!(outcome.display_reference, "order-1767225600123");
    assert!(matches!(
        outcome.persistence,
        BookingPersistence::Failed { ref reason } if reason.contains("timed out")
    ));
}

#[rstest]
fn persistence_serialises_with_a_status_tag() {
    let saved = BookingPersistence::Saved {
        booking_reference: "BK00000001".to_owned(),
    };
    let failed = BookingPersistence::Failed {
        reason: "bookings api slow".to_owned(),
    };

    assert_eq!(
        serde_json::to_value(&saved).expect("encodes"),
        json!({ "status": "saved", "booking_reference": "BK00000001" })
    );
    assert_eq!(
        serde_json::to_value(&failed).expect("encodes"),
        json!({ "status": "failed", "reason": "bookings api slow" })
    );
}
