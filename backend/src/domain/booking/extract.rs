//! Flattening of heterogeneous upstream items into [`BookingRecord`]s.
//!
//! Every field is read through an ordered chain of candidate paths; the first
//! usable value wins. Each travel mode starts from the common chain and
//! prepends its own candidates. Train items also carry a tag-based route whose
//! station labels are mapped to city codes by a pluggable
//! [`StationCodeResolver`]; that mapping is a heuristic, not geocoding.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use station_codes::{LookupTableResolver, StationCodeResolver};
use tracing::debug;

use super::item_path::{first_text, lookup, text_at};
use super::train_route::parse_train_route;
use super::{
    BecknTrace, BookingMetadata, BookingRecord, BookingReference, BookingStatus, BookingType,
    PassengerForm, PaymentStatus, SearchContext, coerce_amount,
};
use crate::domain::{PaymentMethod, UserId};

const DEFAULT_CURRENCY: &str = "INR";
const UNKNOWN_ID: &str = "unknown";
const BOOKING_SOURCE: &str = "web";

const COMMON_NAME: &[&str] = &["details.name", "name", "descriptor.name"];
const COMMON_CODE: &[&str] = &["details.code", "code", "id"];
const COMMON_ORIGIN: &[&str] = &["origin"];
const COMMON_DESTINATION: &[&str] = &["destination"];
const COMMON_DEPARTURE: &[&str] = &["details.departureTime", "time.range.start", "time.timestamp"];
const COMMON_ARRIVAL: &[&str] = &["details.arrivalTime", "time.range.end"];

const TRAIN_ORIGIN: &[&str] = &[
    "details.fromStation",
    "details.source",
    "details.from",
    "source",
    "from",
];
const TRAIN_DESTINATION: &[&str] = &[
    "details.toStation",
    "details.destination",
    "details.to",
    "destination",
    "to",
];

const TRANSIT_DEPARTURE: &[&str] = &[
    "details.departureTime",
    "departure_time",
    "time.range.start",
    "timings.departure",
];
const TRANSIT_ARRIVAL: &[&str] = &[
    "details.arrivalTime",
    "arrival_time",
    "time.range.end",
    "timings.arrival",
];

/// Item fields that vary by travel mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    /// Carrier, hotel, or activity name.
    pub name: Option<String>,
    /// Flight, train, or hotel code.
    pub code: Option<String>,
    /// Origin.
    pub origin: Option<String>,
    /// Destination.
    pub destination: Option<String>,
    /// Departure or check-in.
    pub departure: Option<String>,
    /// Arrival or check-out.
    pub arrival: Option<String>,
}

/// Everything known about a booking at the moment it is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingInput {
    /// Travel mode.
    pub booking_type: BookingType,
    /// Upstream item as selected.
    pub item: Value,
    /// Traveller details as entered.
    pub passenger: PassengerForm,
    /// What the traveller searched for.
    pub search_context: Option<SearchContext>,
    /// Signed-in account id, loosely typed.
    pub user_id: Option<Value>,
    /// Signed-in account e-mail; preferred over the form e-mail.
    pub user_email: Option<String>,
    /// Amount from the booking form, used when the item has no price.
    pub amount: Option<Value>,
    /// Payment transaction id.
    pub transaction_id: Option<String>,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Payment state to record.
    pub payment_status: PaymentStatus,
    /// Beckn confirm exchange, when one happened.
    pub beckn: Option<BecknTrace>,
}

impl BookingInput {
    /// Input for `item` with every optional part empty.
    pub fn new(booking_type: BookingType, item: Value) -> Self {
        Self {
            booking_type,
            item,
            passenger: PassengerForm::default(),
            search_context: None,
            user_id: None,
            user_email: None,
            amount: None,
            transaction_id: None,
            payment_method: PaymentMethod::Card,
            payment_status: PaymentStatus::Confirmed,
            beckn: None,
        }
    }
}

/// Builds booking records, resolving train stations through a strategy.
#[derive(Clone)]
pub struct BookingExtractor {
    resolver: Arc<dyn StationCodeResolver>,
}

impl Default for BookingExtractor {
    fn default() -> Self {
        Self::new(Arc::new(LookupTableResolver::default()))
    }
}

impl BookingExtractor {
    /// Extractor using `resolver` for train stations.
    pub fn new(resolver: Arc<dyn StationCodeResolver>) -> Self {
        Self { resolver }
    }

    /// Read the mode-specific fields of `item`.
    pub fn item_fields(&self, booking_type: BookingType, item: &Value) -> ItemFields {
        let chain = |specific: &[&str], common: &[&str]| {
            first_text(item, specific).or_else(|| first_text(item, common))
        };

        match booking_type {
            BookingType::Flight => ItemFields {
                name: chain(&["details.airline", "airline"], COMMON_NAME),
                code: chain(
                    &["details.flightNumber", "flightNumber", "flight_number"],
                    COMMON_CODE,
                ),
                origin: chain(&["details.origin"], COMMON_ORIGIN),
                destination: chain(&["details.destination"], COMMON_DESTINATION),
                departure: chain(TRANSIT_DEPARTURE, COMMON_DEPARTURE),
                arrival: chain(TRANSIT_ARRIVAL, COMMON_ARRIVAL),
            },
            BookingType::Hotel => ItemFields {
                name: chain(&["details.hotelName", "details.name", "hotel_name"], COMMON_NAME),
                code: chain(&["details.hotelId", "hotel_code"], COMMON_CODE),
                origin: None,
                destination: chain(
                    &["details.city", "city", "location.city.name"],
                    COMMON_DESTINATION,
                )
                .or_else(|| address_city(item)),
                departure: first_text(
                    item,
                    &["details.checkIn", "checkIn", "check_in", "time.range.start"],
                ),
                arrival: first_text(
                    item,
                    &["details.checkOut", "checkOut", "check_out", "time.range.end"],
                ),
            },
            BookingType::Bus => ItemFields {
                name: chain(
                    &[
                        "details.travels",
                        "details.operator",
                        "travels",
                        "bus_operator",
                        "operator_name",
                    ],
                    COMMON_NAME,
                ),
                code: first_text(item, COMMON_CODE),
                origin: chain(
                    &[
                        "details.departureCity",
                        "details.source",
                        "details.from",
                        "source",
                        "from",
                    ],
                    COMMON_ORIGIN,
                ),
                destination: chain(
                    &[
                        "details.arrivalCity",
                        "details.destination",
                        "details.to",
                        "destination",
                        "to",
                    ],
                    COMMON_DESTINATION,
                ),
                departure: chain(TRANSIT_DEPARTURE, COMMON_DEPARTURE),
                arrival: chain(TRANSIT_ARRIVAL, COMMON_ARRIVAL),
            },
            BookingType::Train => self.train_fields(item),
            BookingType::Experience => ItemFields {
                name: first_text(
                    item,
                    &["details.title", "details.name", "descriptor.name", "descriptor.code"],
                ),
                code: first_text(item, &["id", "descriptor.code"]),
                origin: None,
                destination: first_text(
                    item,
                    &["details.location", "details.address", "city", "location_id"],
                ),
                departure: first_text(
                    item,
                    &["time.range.start", "time.timestamp", "volume.start_time"],
                ),
                arrival: first_text(item, &["time.range.end", "volume.end_time"]),
            },
        }
    }

    /// Train fields: the common chain seeds each value, route tags override
    /// it, and train-specific paths fill whatever is still missing.
    fn train_fields(&self, item: &Value) -> ItemFields {
        let route = parse_train_route(item, self.resolver.as_ref());
        let chain = |specific: &[&str], common: &[&str]| {
            first_text(item, specific).or_else(|| first_text(item, common))
        };
        ItemFields {
            name: chain(
                &["details.trainName", "details.name", "train_name", "trainName"],
                COMMON_NAME,
            ),
            code: chain(&["details.trainNumber", "train_number"], COMMON_CODE),
            origin: route
                .origin
                .or_else(|| first_text(item, COMMON_ORIGIN))
                .or_else(|| first_text(item, TRAIN_ORIGIN)),
            destination: route
                .destination
                .or_else(|| first_text(item, COMMON_DESTINATION))
                .or_else(|| first_text(item, TRAIN_DESTINATION)),
            departure: route
                .departure
                .or_else(|| first_text(item, COMMON_DEPARTURE))
                .or_else(|| first_text(item, &["details.departureTime", "departure_time"]))
                .or_else(|| short_desc_time(item))
                .or_else(|| first_text(item, &["time.range.start", "timings.departure"])),
            arrival: route
                .arrival
                .or_else(|| first_text(item, COMMON_ARRIVAL))
                .or_else(|| first_text(item, TRANSIT_ARRIVAL)),
        }
    }

    /// Build the record for `input`.
    pub fn extract(
        &self,
        input: &BookingInput,
        reference: BookingReference,
        now: DateTime<Utc>,
    ) -> BookingRecord {
        let kind = input.booking_type;
        let item = &input.item;
        let mut fields = self.item_fields(kind, item);
        let item_details = apply_search_context(kind, item, input.search_context.as_ref(), &mut fields);

        let is_hotel = kind == BookingType::Hotel;
        let passenger = input.passenger.resolve();
        let passenger_email = input
            .user_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map_or(passenger.email, str::to_owned);

        let amount = lookup(item, "price")
            .and_then(coerce_amount)
            .or_else(|| input.amount.as_ref().and_then(coerce_amount));
        if amount.is_none() {
            debug!(booking_type = %kind, "no numeric amount found for booking");
        }

        let beckn = input.beckn.as_ref();
        BookingRecord {
            booking_reference: reference,
            user_id: input.user_id.as_ref().and_then(UserId::coerce),
            booking_type: kind,
            item_id: text_at(item, "id").unwrap_or_else(|| UNKNOWN_ID.to_owned()),
            provider_id: first_text(item, &["providerId", "provider", "provider.id"])
                .unwrap_or_else(|| UNKNOWN_ID.to_owned()),
            item_name: fields.name,
            item_code: fields.code,
            origin: fields.origin,
            destination: fields.destination,
            check_in_date: fields.departure.clone().filter(|_| is_hotel),
            check_out_date: fields.arrival.clone().filter(|_| is_hotel),
            departure_time: fields.departure,
            arrival_time: fields.arrival,
            passenger_name: passenger.name,
            passenger_email,
            passenger_phone: passenger.phone,
            passenger_gender: passenger.gender,
            date_of_birth: passenger.date_of_birth,
            nationality: passenger.nationality,
            passport_number: passenger.passport_number,
            address_line1: passenger.address_line1,
            address_line2: passenger.address_line2,
            city: passenger.city,
            state: passenger.state,
            postal_code: passenger.postal_code,
            country: passenger.country,
            transaction_id: input.transaction_id.clone(),
            payment_method: input.payment_method,
            payment_status: input.payment_status.clone(),
            amount,
            currency: first_text(item, &["currency", "price.currency"])
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            booking_status: BookingStatus::Confirmed,
            beckn_transaction_id: beckn.map(|trace| trace.transaction_id.clone()),
            beckn_message_id: beckn.map(|trace| trace.message_id.clone()),
            order_id: beckn.map(|trace| trace.order_id.clone()),
            item_details,
            booking_metadata: BookingMetadata {
                payment_date: now,
                booking_source: BOOKING_SOURCE.to_owned(),
                search_context: input.search_context.clone(),
                beckn_response: beckn.map(|trace| trace.response.clone()),
            },
        }
    }
}

/// Build a record with the built-in station table.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use peerdesk::domain::{BookingInput, BookingReference, BookingType, extract_booking};
/// use serde_json::json;
///
/// let input = BookingInput::new(
///     BookingType::Flight,
///     json!({ "id": "6E-201", "airline": "IndiGo", "price": "4,500" }),
/// );
/// let now = Utc::now();
/// let record = extract_booking(&input, BookingReference::generate(now), now);
///
/// assert_eq!(record.item_name.as_deref(), Some("IndiGo"));
/// assert_eq!(record.amount, Some(4500.0));
/// assert_eq!(record.passenger_name, "Guest");
/// ```
pub fn extract_booking(
    input: &BookingInput,
    reference: BookingReference,
    now: DateTime<Utc>,
) -> BookingRecord {
    BookingExtractor::default().extract(input, reference, now)
}

/// City from a hotel's `details.address`: the last comma-separated part of a
/// string, or `city` then `state` of an object.
fn address_city(item: &Value) -> Option<String> {
    match lookup(item, "details.address")? {
        Value::String(address) => address
            .rsplit(',')
            .next()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_owned),
        address @ Value::Object(_) => first_text(address, &["city", "state"]),
        _ => None,
    }
}

/// Departure time written as the first word of `descriptor.short_desc`.
fn short_desc_time(item: &Value) -> Option<String> {
    text_at(item, "descriptor.short_desc")
        .and_then(|desc| desc.split_whitespace().next().map(str::to_owned))
}

/// Apply the traveller's search to the extracted fields and return the item
/// as it should be stored. Resolved train times and any dates taken from the
/// search are written into `details` for the confirmation view.
fn apply_search_context(
    kind: BookingType,
    item: &Value,
    context: Option<&SearchContext>,
    fields: &mut ItemFields,
) -> Value {
    let mut detail_overrides = Vec::new();
    if kind == BookingType::Train {
        detail_overrides.extend(fields.departure.clone().map(|time| ("departureTime", time)));
        detail_overrides.extend(fields.arrival.clone().map(|time| ("arrivalTime", time)));
    }

    if let Some(context) = context {
        let given = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_owned)
        };

        if let Some(origin) = given(&context.origin) {
            fields.origin = Some(origin);
        }
        if let Some(destination) = given(&context.destination) {
            fields.destination = Some(destination);
        }

        match kind {
            BookingType::Hotel => {
                if let Some(check_in) = given(&context.check_in_date) {
                    fields.departure = Some(check_in.clone());
                    detail_overrides.push(("checkIn", check_in));
                }
                if let Some(check_out) = given(&context.check_out_date) {
                    fields.arrival = Some(check_out.clone());
                    detail_overrides.push(("checkOut", check_out));
                }
            }
            BookingType::Experience => {
                if let Some(date) = given(&context.travel_date) {
                    fields.departure = Some(date.clone());
                    detail_overrides.push(("departureTime", date));
                }
            }
            BookingType::Flight | BookingType::Bus | BookingType::Train => {}
        }
    }

    let mut stored = item.clone();
    if detail_overrides.is_empty() && kind != BookingType::Train {
        return stored;
    }
    if let Some(object) = stored.as_object_mut() {
        let details = object
            .entry("details")
            .or_insert_with(|| Value::Object(Map::new()));
        if !details.is_object() {
            *details = Value::Object(Map::new());
        }
        if let Some(details) = details.as_object_mut() {
            for (key, value) in detail_overrides {
                details.insert(key.to_owned(), Value::String(value));
            }
        }
    }
    stored
}
