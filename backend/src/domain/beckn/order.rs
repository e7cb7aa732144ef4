//! The `message` half of a Beckn envelope.
//!
//! Only the parts of the order this client sends are modelled; responses are
//! passed back to callers as raw JSON.

use serde::{Deserialize, Serialize};

/// Order state sent with a confirm.
pub const CONFIRMED_STATE: &str = "CONFIRMED";
/// Fulfillment type sent with a confirm.
pub const FULFILLMENT_TYPE: &str = "DELIVERY";
/// Payment collected before the trip.
pub const PAYMENT_TYPE: &str = "PRE-FULFILLMENT";
/// Payment already captured.
pub const PAYMENT_STATUS: &str = "PAID";

/// Provider an order is placed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    pub id: String,
}

/// Units ordered of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub count: u32,
}

/// One ordered item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub quantity: Quantity,
}

impl OrderItem {
    /// A single unit of `id`.
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quantity: Quantity { count: 1 },
        }
    }
}

/// Postal address on the bill, taken from the resolved passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub door: String,
    pub building: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub area_code: String,
}

/// Who pays for the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: BillingAddress,
}

/// Traveller named on the fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub gender: String,
}

/// How the provider reaches the traveller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
}

/// Traveller and contact details for the fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub person: Person,
    pub contact: Contact,
}

/// How the order is delivered to the traveller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    /// Fulfillment type, [`FULFILLMENT_TYPE`] for confirms.
    #[serde(rename = "type")]
    pub kind: String,
    pub customer: Customer,
}

/// Amount and currency as Beckn strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub currency: String,
    pub value: String,
}

/// Amount and transaction reference of a captured payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentParams {
    pub amount: String,
    pub currency: String,
    pub transaction_id: String,
}

/// Payment terms and state of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayment {
    /// Payment type, [`PAYMENT_TYPE`] for confirms.
    #[serde(rename = "type")]
    pub kind: String,
    /// Payment state, [`PAYMENT_STATUS`] once captured.
    pub status: String,
    pub params: PaymentParams,
}

/// Total quoted for the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub price: Price,
}

/// Order body of a select or confirm message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BecknOrder {
    /// Client-assigned order id; set on confirm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Order state; [`CONFIRMED_STATE`] on confirm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<Fulfillment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<OrderPayment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

/// Message body: an order for select and confirm, an order id for status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BecknMessage {
    /// Select and confirm body.
    Order { order: BecknOrder },
    /// Status body.
    OrderId { order_id: String },
}

impl BecknMessage {
    /// Order id carried by either form.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            Self::Order { order } => order.id.as_deref(),
            Self::OrderId { order_id } => Some(order_id),
        }
    }
}
