//! Beckn protocol envelopes sent to the buyer application (BAP).
//!
//! Every request is a `{context, message}` pair. The context identifies the
//! sender and correlates the transaction; the message carries the order.
//! Builders here assemble the three calls checkout makes: `select`,
//! `confirm`, and `status`.

mod context;
mod order;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use context::{
    BapIdentity, BecknAction, BecknContext, BecknDomain, CITY, CORE_VERSION, COUNTRY, TTL,
};
pub use order::{
    Billing, BillingAddress, BecknMessage, BecknOrder, CONFIRMED_STATE, Contact, Customer,
    FULFILLMENT_TYPE, Fulfillment, OrderItem, OrderPayment, PAYMENT_STATUS, PAYMENT_TYPE,
    PaymentParams, Person, Price, ProviderRef, Quantity, Quote,
};

use crate::domain::booking::first_text;
use crate::domain::{BookingType, Passenger};

/// Provider id sent when the item names none.
pub const FALLBACK_PROVIDER_ID: &str = "provider-001";

const ITEM_ID_PATHS: &[&str] = &["id"];
const PROVIDER_ID_PATHS: &[&str] = &["providerId", "provider", "provider.id"];

/// A complete Beckn request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BecknEnvelope {
    /// Routing and correlation header.
    pub context: BecknContext,
    /// Action payload.
    pub message: BecknMessage,
}

impl BecknEnvelope {
    /// Action named in the context.
    pub fn action(&self) -> BecknAction {
        self.context.action
    }

    /// Transaction id from the context.
    pub fn transaction_id(&self) -> &str {
        &self.context.transaction_id
    }

    /// Message id from the context.
    pub fn message_id(&self) -> &str {
        &self.context.message_id
    }

    /// Order id, when the message carries one.
    pub fn order_id(&self) -> Option<&str> {
        self.message.order_id()
    }
}

/// What a confirm needs beyond the selected item.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmOrder<'a> {
    /// Travel mode; picks the Beckn domain.
    pub booking_type: BookingType,
    /// Item as selected on the search page.
    pub item: &'a Value,
    /// Traveller with defaults applied.
    pub passenger: &'a Passenger,
    /// Payment transaction id from the simulator.
    pub payment_transaction_id: &'a str,
    /// Amount paid; sent as `"0"` when unknown.
    pub amount: Option<f64>,
    /// ISO currency code.
    pub currency: &'a str,
}

fn provider_of(item: &Value) -> ProviderRef {
    ProviderRef {
        id: first_text(item, PROVIDER_ID_PATHS).unwrap_or_else(|| FALLBACK_PROVIDER_ID.to_owned()),
    }
}

fn item_of(item: &Value) -> OrderItem {
    OrderItem::single(first_text(item, ITEM_ID_PATHS).unwrap_or_else(|| "unknown".to_owned()))
}

/// Amount in Beckn's string form; absent amounts are sent as zero.
fn amount_text(amount: Option<f64>) -> String {
    amount.unwrap_or(0.0).to_string()
}

/// Build a `select` for one unit of `item`.
pub fn select_request(
    identity: &BapIdentity,
    booking_type: BookingType,
    item: &Value,
    now: DateTime<Utc>,
) -> BecknEnvelope {
    BecknEnvelope {
        context: BecknContext::new(identity, booking_type.into(), BecknAction::Select, now),
        message: BecknMessage::Order {
            order: BecknOrder {
                provider: Some(provider_of(item)),
                items: vec![item_of(item)],
                ..BecknOrder::default()
            },
        },
    }
}

/// Build a `confirm` placing a paid order for the selected item.
///
/// The order id is `order-<epoch millis>`.
pub fn confirm_request(
    identity: &BapIdentity,
    order: &ConfirmOrder<'_>,
    now: DateTime<Utc>,
) -> BecknEnvelope {
    let passenger = order.passenger;
    let amount = amount_text(order.amount);
    let currency = order.currency.to_owned();

    let billing = Billing {
        name: passenger.name.clone(),
        email: passenger.email.clone(),
        phone: passenger.phone.clone(),
        address: BillingAddress {
            door: passenger.address_line1.clone(),
            building: passenger.address_line2.clone(),
            street: passenger.address_line1.clone(),
            city: passenger.city.clone(),
            state: passenger.state.clone(),
            country: passenger.country.clone(),
            area_code: passenger.postal_code.clone(),
        },
    };
    let fulfillment = Fulfillment {
        kind: FULFILLMENT_TYPE.to_owned(),
        customer: Customer {
            person: Person {
                name: passenger.name.clone(),
                age: passenger.age,
                gender: passenger.gender.clone(),
            },
            contact: Contact {
                phone: passenger.phone.clone(),
                email: passenger.email.clone(),
            },
        },
    };

    BecknEnvelope {
        context: BecknContext::new(
            identity,
            order.booking_type.into(),
            BecknAction::Confirm,
            now,
        ),
        message: BecknMessage::Order {
            order: BecknOrder {
                id: Some(format!("order-{}", now.timestamp_millis())),
                state: Some(CONFIRMED_STATE.to_owned()),
                provider: Some(provider_of(order.item)),
                items: vec![item_of(order.item)],
                billing: Some(billing),
                fulfillment: Some(fulfillment),
                payment: Some(OrderPayment {
                    kind: PAYMENT_TYPE.to_owned(),
                    status: PAYMENT_STATUS.to_owned(),
                    params: PaymentParams {
                        amount: amount.clone(),
                        currency: currency.clone(),
                        transaction_id: order.payment_transaction_id.to_owned(),
                    },
                }),
                quote: Some(Quote {
                    price: Price {
                        currency,
                        value: amount,
                    },
                }),
            },
        },
    }
}

/// Build a `status` query for `order_id`.
pub fn status_request(
    identity: &BapIdentity,
    booking_type: BookingType,
    order_id: impl Into<String>,
    now: DateTime<Utc>,
) -> BecknEnvelope {
    BecknEnvelope {
        context: BecknContext::new(identity, booking_type.into(), BecknAction::Status, now),
        message: BecknMessage::OrderId {
            order_id: order_id.into(),
        },
    }
}

#[cfg(test)]
mod tests;
