//! Booking history as shown on the "my bookings" page.
//!
//! Bookings are fetched twice, once by account e-mail and once by account id,
//! because older bookings were saved without a user id. The two lists are
//! merged here, then bucketed for the filter tabs.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BookingStatus, BookingType, coerce_amount};

/// Flat charge deducted from every refund.
pub const CANCELLATION_CHARGE: f64 = 500.0;

/// Refund processing time quoted to the traveller.
pub const REFUND_PROCESSING_TIME: &str = "3-5 business days";

/// A booking as returned by the bookings API.
///
/// Only the fields this crate reasons about are typed; everything else is
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBooking {
    /// Booking reference; the identity used for de-duplication.
    pub booking_reference: String,
    /// Travel mode as stored; unknown modes are kept verbatim.
    #[serde(default)]
    pub booking_type: String,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_status: Option<BookingStatus>,
    /// Amount charged, loosely typed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    /// Creation time as stored; see [`StoredBooking::created_time`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    /// Remaining columns.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredBooking {
    /// Parsed travel mode, if known.
    pub fn kind(&self) -> Option<BookingType> {
        self.booking_type.parse().ok()
    }

    /// Numeric amount, if the stored value parses.
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.as_ref().and_then(coerce_amount)
    }

    /// Creation time, if the stored value is an RFC 3339 timestamp, a
    /// zone-less `YYYY-MM-DD HH:MM:SS` timestamp read as UTC, or epoch
    /// milliseconds.
    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        match self.created_at.as_ref()? {
            Value::String(raw) => parse_timestamp(raw.trim()),
            Value::Number(millis) => millis.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
                .ok()
                .map(|time| time.and_utc())
        })
}

/// Merge booking lists into one, newest first.
///
/// A booking appearing in several lists keeps the position of its first
/// appearance but takes the contents of its last. The merged list is then
/// sorted by `created_at`, descending; bookings without a readable
/// timestamp sort last and ties keep merge order.
pub fn merge_booking_lists<I>(lists: I) -> Vec<StoredBooking>
where
    I: IntoIterator<Item = Vec<StoredBooking>>,
{
    let mut merged: Vec<StoredBooking> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for booking in lists.into_iter().flatten() {
        match positions.get(&booking.booking_reference) {
            Some(&index) => merged[index] = booking,
            None => {
                positions.insert(booking.booking_reference.clone(), merged.len());
                merged.push(booking);
            }
        }
    }

    merged.sort_by_key(|booking| Reverse(booking.created_time()));
    merged
}

/// Bookings grouped for the filter tabs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingBuckets {
    all: Vec<StoredBooking>,
    by_type: BTreeMap<BookingType, Vec<StoredBooking>>,
}

impl BookingBuckets {
    /// Every booking, in input order.
    pub fn all(&self) -> &[StoredBooking] {
        &self.all
    }

    /// Bookings of one travel mode.
    pub fn of_type(&self, kind: BookingType) -> &[StoredBooking] {
        self.by_type.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Number of bookings of one travel mode.
    pub fn count(&self, kind: BookingType) -> usize {
        self.of_type(kind).len()
    }

    /// Number of bookings overall, including unknown modes.
    pub fn total(&self) -> usize {
        self.all.len()
    }

    /// Tab counts for every travel mode, in tab order.
    pub fn counts(&self) -> impl Iterator<Item = (BookingType, usize)> + '_ {
        BookingType::ALL.into_iter().map(|kind| (kind, self.count(kind)))
    }
}

/// Group `bookings` by travel mode. Unknown modes only appear under "all".
pub fn bucket_by_type(bookings: Vec<StoredBooking>) -> BookingBuckets {
    let mut by_type: BTreeMap<BookingType, Vec<StoredBooking>> = BTreeMap::new();
    for booking in &bookings {
        if let Some(kind) = booking.kind() {
            by_type.entry(kind).or_default().push(booking.clone());
        }
    }
    BookingBuckets {
        all: bookings,
        by_type,
    }
}

/// Refund shown before the traveller confirms a cancellation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundQuote {
    /// Refund identifier, `REF<epoch millis>`.
    pub refund_id: String,
    /// Amount originally paid.
    pub original_amount: f64,
    /// Charge deducted.
    pub cancellation_charge: f64,
    /// Amount returned; never negative.
    pub refund_amount: f64,
    /// Quoted processing time.
    pub processing_time: &'static str,
}

/// Quote the refund for cancelling `booking` at `now`.
///
/// A missing or unparseable amount is treated as zero.
pub fn refund_quote(booking: &StoredBooking, now: DateTime<Utc>) -> RefundQuote {
    let original_amount = booking.amount_value().unwrap_or(0.0);
    RefundQuote {
        refund_id: format!("REF{}", now.timestamp_millis()),
        original_amount,
        cancellation_charge: CANCELLATION_CHARGE,
        refund_amount: (original_amount - CANCELLATION_CHARGE).max(0.0),
        processing_time: REFUND_PROCESSING_TIME,
    }
}

/// Reason given when cancelling a booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancellationReason {
    /// The traveller asked to cancel.
    #[default]
    CustomerRequest,
    /// Travel plans changed.
    ChangeOfPlans,
    /// Emergency.
    Emergency,
    /// The same trip was booked twice.
    DuplicateBooking,
    /// The price changed after booking.
    PriceChange,
    /// The provider can no longer deliver.
    ServiceUnavailable,
}

impl CancellationReason {
    /// Wire identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Self::CustomerRequest => "CUSTOMER_REQUEST",
            Self::ChangeOfPlans => "CHANGE_OF_PLANS",
            Self::Emergency => "EMERGENCY",
            Self::DuplicateBooking => "DUPLICATE_BOOKING",
            Self::PriceChange => "PRICE_CHANGE",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::CustomerRequest => "Customer requested cancellation",
            Self::ChangeOfPlans => "Change of travel plans",
            Self::Emergency => "Emergency situation",
            Self::DuplicateBooking => "Duplicate booking",
            Self::PriceChange => "Price change",
            Self::ServiceUnavailable => "Service no longer available",
        }
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn booking(reference: &str, kind: &str, created: Option<i64>) -> StoredBooking {
        StoredBooking {
            booking_reference: reference.to_owned(),
            booking_type: kind.to_owned(),
            booking_status: Some(BookingStatus::Confirmed),
            amount: None,
            created_at: created.map(|secs| json!(secs * 1000)),
            extra: Map::new(),
        }
    }

    #[rstest]
    fn later_lists_replace_earlier_entries() {
        let mut updated = booking("BK1", "flight", Some(100));
        updated.booking_status = Some(BookingStatus::Cancelled);

        let merged = merge_booking_lists([
            vec![booking("BK1", "flight", Some(100)), booking("BK2", "hotel", Some(300))],
            vec![updated.clone(), booking("BK3", "bus", Some(200))],
        ]);

        let references: Vec<_> = merged.iter().map(|b| b.booking_reference.as_str()).collect();
        assert_eq!(references, ["BK2", "BK3", "BK1"]);
        assert_eq!(merged[2], updated);
    }

    #[rstest]
    fn undated_bookings_sort_last_in_merge_order() {
        let merged = merge_booking_lists([vec![
            booking("BK1", "train", None),
            booking("BK2", "train", Some(5)),
            booking("BK3", "train", None),
        ]]);
        let references: Vec<_> = merged.iter().map(|b| b.booking_reference.as_str()).collect();
        assert_eq!(references, ["BK2", "BK1", "BK3"]);
    }

    #[rstest]
    fn unreadable_timestamps_do_not_reject_the_list() {
        let rows = json!([
            { "booking_reference": "BK1", "booking_type": "bus", "created_at": "2026-01-02T08:00:00Z" },
            { "booking_reference": "BK2", "booking_type": "bus", "created_at": "last tuesday" },
            { "booking_reference": "BK3", "booking_type": "bus", "created_at": "2026-01-05 09:30:00" }
        ]);
        let stored: Vec<StoredBooking> = serde_json::from_value(rows).expect("every row decodes");

        let merged = merge_booking_lists([stored]);

        let references: Vec<_> = merged.iter().map(|b| b.booking_reference.as_str()).collect();
        assert_eq!(references, ["BK3", "BK1", "BK2"]);
        assert_eq!(merged[2].created_at, Some(json!("last tuesday")));
        assert!(merged[2].created_time().is_none());
    }

    #[rstest]
    #[case(json!("2026-02-01T10:00:00+05:30"), Some(1_769_920_200_000))]
    #[case(json!("2026-02-01 04:30:00.250"), Some(1_769_920_200_250))]
    #[case(json!(1_769_920_200_000_i64), Some(1_769_920_200_000))]
    #[case(json!(true), None)]
    fn created_time_reads_common_encodings(#[case] raw: Value, #[case] millis: Option<i64>) {
        let mut stored = booking("BK1", "hotel", None);
        stored.created_at = Some(raw);
        assert_eq!(stored.created_time().map(|time| time.timestamp_millis()), millis);
    }

    #[rstest]
    fn buckets_count_known_types_only() {
        let buckets = bucket_by_type(vec![
            booking("BK1", "flight", None),
            booking("BK2", "Flight", None),
            booking("BK3", "cruise", None),
            booking("BK4", "hotel", None),
        ]);
        assert_eq!(buckets.total(), 4);
        assert_eq!(buckets.count(BookingType::Flight), 2);
        assert_eq!(buckets.count(BookingType::Hotel), 1);
        assert_eq!(buckets.count(BookingType::Bus), 0);
        let counts: Vec<_> = buckets.counts().collect();
        assert_eq!(counts.len(), BookingType::ALL.len());
    }

    #[rstest]
    #[case(json!(4500), 4000.0)]
    #[case(json!("1,200"), 700.0)]
    #[case(json!(300), 0.0)]
    #[case(json!("unknown"), 0.0)]
    fn refunds_deduct_flat_charge(#[case] amount: Value, #[case] refund: f64) {
        let mut stored = booking("BK1", "bus", None);
        stored.amount = Some(amount);
        let now = Utc.timestamp_millis_opt(1_767_225_600_123).single().expect("valid");

        let quote = refund_quote(&stored, now);

        assert_eq!(quote.refund_amount, refund);
        assert_eq!(quote.cancellation_charge, CANCELLATION_CHARGE);
        assert_eq!(quote.refund_id, "REF1767225600123");
        assert_eq!(quote.processing_time, "3-5 business days");
    }

    #[rstest]
    fn stored_bookings_keep_unknown_columns() {
        let raw = json!({
            "booking_reference": "BK9",
            "booking_type": "hotel",
            "created_at": "2026-02-01T10:00:00Z",
            "item_name": "Lakeview"
        });
        let stored: StoredBooking = serde_json::from_value(raw.clone()).expect("decodes");
        assert_eq!(stored.kind(), Some(BookingType::Hotel));
        assert_eq!(stored.extra.get("item_name"), Some(&json!("Lakeview")));
        assert_eq!(serde_json::to_value(&stored).expect("encodes"), raw);
    }

    #[rstest]
    fn reasons_serialise_as_screaming_ids() {
        let reason = CancellationReason::ChangeOfPlans;
        assert_eq!(serde_json::to_value(reason).expect("encodes"), json!("CHANGE_OF_PLANS"));
        assert_eq!(reason.id(), "CHANGE_OF_PLANS");
        assert_eq!(reason.to_string(), "Change of travel plans");
    }
}
