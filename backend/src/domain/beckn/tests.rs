//! Regression coverage for this module.

use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;
use url::Url;

use super::*;
use crate::domain::PassengerForm;

#[fixture]
fn identity() -> BapIdentity {
    BapIdentity::new(
        "travel-discovery-bap.example.com",
        Url::parse("http://localhost:8081/").expect("valid url"),
    )
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_767_225_600_123)
        .single()
        .expect("valid timestamp")
}

#[rstest]
fn select_names_provider_and_single_item(identity: BapIdentity, now: DateTime<Utc>) {
    let item = json!({ "id": "6E-201", "providerId": "indigo" });
    let envelope = select_request(&identity, BookingType::Flight, &item, now);

    let value = serde_json::to_value(&envelope).expect("encodes");
    assert_eq!(value["context"]["action"], "select");
    assert_eq!(value["context"]["domain"], "mobility");
    assert_eq!(
        value["message"]["order"],
        json!({
            "provider": { "id": "indigo" },
            "items": [{ "id": "6E-201", "quantity": { "count": 1 } }]
        })
    );
    assert_eq!(envelope.order_id(), None);
}

#[rstest]
fn confirm_carries_billing_payment_and_quote(identity: BapIdentity, now: DateTime<Utc>) {
    let item = json!({ "id": "hotel-7" });
    let mut passenger = PassengerForm {
        name: Some("Asha Rao".to_owned()),
        age: Some(31),
        ..PassengerForm::default()
    }
    .resolve();
    passenger.email = "asha@example.com".to_owned();

    let envelope = confirm_request(
        &identity,
        &ConfirmOrder {
            booking_type: BookingType::Hotel,
            item: &item,
            passenger: &passenger,
            payment_transaction_id: "TXN1767225600000",
            amount: Some(8200.0),
            currency: "INR",
        },
        now,
    );

    assert_eq!(envelope.order_id(), Some("order-1767225600123"));
    assert_eq!(envelope.action(), BecknAction::Confirm);
    assert_eq!(envelope.context.domain, BecknDomain::Hospitality);

    let value = serde_json::to_value(&envelope).expect("encodes");
    let order = &value["message"]["order"];
    assert_eq!(order["state"], "CONFIRMED");
    assert_eq!(order["provider"]["id"], FALLBACK_PROVIDER_ID);
    assert_eq!(order["billing"]["email"], "asha@example.com");
    assert_eq!(order["billing"]["address"]["area_code"], "000000");
    assert_eq!(order["fulfillment"]["type"], "DELIVERY");
    assert_eq!(order["fulfillment"]["customer"]["person"]["age"], 31);
    assert_eq!(order["payment"]["type"], "PRE-FULFILLMENT");
    assert_eq!(order["payment"]["status"], "PAID");
    assert_eq!(order["payment"]["params"]["amount"], "8200");
    assert_eq!(order["payment"]["params"]["transaction_id"], "TXN1767225600000");
    assert_eq!(order["quote"]["price"], json!({ "currency": "INR", "value": "8200" }));
}

#[rstest]
fn status_sends_bare_order_id(identity: BapIdentity, now: DateTime<Utc>) {
    let envelope = status_request(&identity, BookingType::Bus, "order-42", now);
    let value = serde_json::to_value(&envelope).expect("encodes");
    assert_eq!(value["message"], json!({ "order_id": "order-42" }));
    assert_eq!(envelope.order_id(), Some("order-42"));
}

#[rstest]
fn envelopes_decode_back_from_json(identity: BapIdentity, now: DateTime<Utc>) {
    let envelope = status_request(&identity, BookingType::Train, "order-9", now);
    let value = serde_json::to_value(&envelope).expect("encodes");
    let decoded: BecknEnvelope = serde_json::from_value(value).expect("decodes");
    assert_eq!(decoded, envelope);
}
