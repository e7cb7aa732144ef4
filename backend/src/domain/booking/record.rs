//! The flat booking record persisted by the bookings API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BookingReference;
use crate::domain::{PaymentMethod, UserId};

/// Travel mode of a booking; drives which item fields are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    /// Air travel.
    Flight,
    /// Hotel stay.
    Hotel,
    /// Coach travel.
    Bus,
    /// Rail travel.
    Train,
    /// Activities and tours.
    Experience,
}

impl BookingType {
    /// Every type, in filter-tab order.
    pub const ALL: [Self; 5] = [
        Self::Flight,
        Self::Hotel,
        Self::Bus,
        Self::Train,
        Self::Experience,
    ];

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Experience => "experience",
        }
    }

    /// Whether the booking moves the traveller between places.
    pub const fn is_mobility(self) -> bool {
        matches!(self, Self::Flight | Self::Bus | Self::Train)
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown booking type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBookingType(pub String);

impl fmt::Display for UnknownBookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown booking type {:?}; expected flight, hotel, bus, train, or experience",
            self.0
        )
    }
}

impl std::error::Error for UnknownBookingType {}

impl FromStr for BookingType {
    type Err = UnknownBookingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownBookingType(s.to_owned()))
    }
}

/// Status enum that keeps unrecognised wire values verbatim.
macro_rules! wire_status {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$variant_meta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$variant_meta])* $variant,)+
            /// A status this client does not know, as received.
            Other(String),
        }

        impl $name {
            /// Wire spelling.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Other(raw),
                }
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> Self {
                match status {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_status! {
    /// Lifecycle state of a booking.
    BookingStatus {
        /// Paid and confirmed with the provider.
        Confirmed => "CONFIRMED",
        /// Awaiting confirmation.
        Pending => "PENDING",
        /// Cancelled by the traveller.
        Cancelled => "CANCELLED",
    }
}

wire_status! {
    /// Payment state recorded alongside the booking.
    PaymentStatus {
        /// Money captured.
        Paid => "PAID",
        /// Payment confirmed by the provider.
        Confirmed => "CONFIRMED",
        /// Refund issued after cancellation.
        Refunded => "REFUNDED",
    }
}

/// Traveller details as entered on the booking form.
///
/// Every field is optional; [`PassengerForm::resolve`] applies the defaults
/// the bookings API expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassengerForm {
    /// Full name.
    #[serde(alias = "passenger_name")]
    pub name: Option<String>,
    /// Contact e-mail.
    #[serde(alias = "passenger_email")]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(alias = "passenger_phone")]
    pub phone: Option<String>,
    /// Gender.
    #[serde(alias = "passenger_gender")]
    pub gender: Option<String>,
    /// Age in years.
    #[serde(alias = "passenger_age")]
    pub age: Option<u32>,
    /// Date of birth.
    pub date_of_birth: Option<String>,
    /// Nationality code.
    pub nationality: Option<String>,
    /// Passport number.
    pub passport_number: Option<String>,
    /// First address line.
    #[serde(alias = "address")]
    pub address_line1: Option<String>,
    /// Second address line.
    pub address_line2: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Postal code.
    #[serde(alias = "zip")]
    pub postal_code: Option<String>,
    /// Country.
    pub country: Option<String>,
}

/// Traveller details with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Full name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Gender.
    pub gender: String,
    /// Age in years.
    pub age: Option<u32>,
    /// Date of birth.
    pub date_of_birth: Option<String>,
    /// Nationality code.
    pub nationality: String,
    /// Passport number.
    pub passport_number: Option<String>,
    /// First address line.
    pub address_line1: String,
    /// Second address line.
    pub address_line2: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

fn filled(value: Option<&String>) -> Option<String> {
    value
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn filled_or(value: Option<&String>, default: &str) -> String {
    filled(value).unwrap_or_else(|| default.to_owned())
}

impl PassengerForm {
    /// Apply the bookings API defaults to every blank field.
    pub fn resolve(&self) -> Passenger {
        Passenger {
            name: filled_or(self.name.as_ref(), "Guest"),
            email: filled_or(self.email.as_ref(), "guest@example.com"),
            phone: filled_or(self.phone.as_ref(), "0000000000"),
            gender: filled_or(self.gender.as_ref(), "Other"),
            age: self.age,
            date_of_birth: filled(self.date_of_birth.as_ref()),
            nationality: filled_or(self.nationality.as_ref(), "IN"),
            passport_number: filled(self.passport_number.as_ref()),
            address_line1: filled_or(self.address_line1.as_ref(), "Not Provided"),
            address_line2: filled_or(self.address_line2.as_ref(), ""),
            city: filled_or(self.city.as_ref(), "Unknown"),
            state: filled_or(self.state.as_ref(), "Unknown"),
            postal_code: filled_or(self.postal_code.as_ref(), "000000"),
            country: filled_or(self.country.as_ref(), "India"),
        }
    }
}

/// What the traveller searched for; overrides item data where present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchContext {
    /// Origin city code.
    pub origin: Option<String>,
    /// Destination city code.
    pub destination: Option<String>,
    /// Hotel check-in date.
    pub check_in_date: Option<String>,
    /// Hotel check-out date.
    pub check_out_date: Option<String>,
    /// Experience date.
    pub travel_date: Option<String>,
}

/// Identifiers of the Beckn confirm exchange behind a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BecknTrace {
    /// Beckn transaction id.
    pub transaction_id: String,
    /// Beckn message id of the confirm call.
    pub message_id: String,
    /// Order id sent in the confirm call.
    pub order_id: String,
    /// Raw confirm response.
    pub response: Value,
}

/// Audit data stored with the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingMetadata {
    /// When payment completed.
    pub payment_date: DateTime<Utc>,
    /// Channel that created the booking.
    pub booking_source: String,
    /// Search that led to the booking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_context: Option<SearchContext>,
    /// Raw Beckn confirm response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beckn_response: Option<Value>,
}

/// The fixed-schema record sent to `POST /api/bookings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Human-facing reference.
    pub booking_reference: BookingReference,
    /// Owning account, when signed in.
    pub user_id: Option<UserId>,
    /// Travel mode.
    pub booking_type: BookingType,
    /// Upstream item id, or `unknown`.
    pub item_id: String,
    /// Upstream provider id, or `unknown`.
    pub provider_id: String,
    /// Carrier, hotel, or activity name.
    pub item_name: Option<String>,
    /// Flight, train, or hotel code.
    pub item_code: Option<String>,
    /// Origin city code.
    pub origin: Option<String>,
    /// Destination city code or name.
    pub destination: Option<String>,
    /// Departure or check-in time.
    pub departure_time: Option<String>,
    /// Arrival or check-out time.
    pub arrival_time: Option<String>,
    /// Hotel check-in; `None` for other types.
    pub check_in_date: Option<String>,
    /// Hotel check-out; `None` for other types.
    pub check_out_date: Option<String>,
    /// Traveller name.
    pub passenger_name: String,
    /// Traveller e-mail.
    pub passenger_email: String,
    /// Traveller phone.
    pub passenger_phone: String,
    /// Traveller gender.
    pub passenger_gender: String,
    /// Traveller date of birth.
    pub date_of_birth: Option<String>,
    /// Traveller nationality.
    pub nationality: String,
    /// Traveller passport.
    pub passport_number: Option<String>,
    /// Address line one.
    pub address_line1: String,
    /// Address line two.
    pub address_line2: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
    /// Payment transaction id.
    pub transaction_id: Option<String>,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Amount charged; `None` when no numeric amount was available.
    pub amount: Option<f64>,
    /// ISO currency code.
    pub currency: String,
    /// Booking state.
    pub booking_status: BookingStatus,
    /// Beckn transaction id.
    pub beckn_transaction_id: Option<String>,
    /// Beckn message id.
    pub beckn_message_id: Option<String>,
    /// Beckn order id.
    pub order_id: Option<String>,
    /// Upstream item as booked.
    pub item_details: Value,
    /// Audit data.
    pub booking_metadata: BookingMetadata,
}

impl BookingRecord {
    /// Record the Beckn confirm exchange that placed this booking.
    pub fn attach_beckn(&mut self, trace: BecknTrace) {
        self.beckn_transaction_id = Some(trace.transaction_id);
        self.beckn_message_id = Some(trace.message_id);
        self.order_id = Some(trace.order_id);
        self.booking_metadata.beckn_response = Some(trace.response);
    }
}

/// Coerce a loosely typed amount into a number.
///
/// Numbers pass through; strings have thousands separators removed before
/// parsing; a Beckn price object contributes its `value`. Anything that does
/// not parse to a finite number yields `None`.
pub fn coerce_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|amount| amount.is_finite()),
        Value::String(text) => {
            let cleaned: String = text.chars().filter(|ch| *ch != ',').collect();
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|amount| amount.is_finite())
        }
        Value::Object(map) => map.get("value").and_then(coerce_amount),
        _ => None,
    }
}
