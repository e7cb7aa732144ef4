//! Travel bookings: the flat record, its extraction from upstream items, and
//! the booking history views.

mod extract;
mod history;
mod item_path;
mod record;
mod reference;
mod train_route;

pub(crate) use item_path::first_text;

pub use extract::{BookingExtractor, BookingInput, ItemFields, extract_booking};
pub use history::{
    BookingBuckets, CANCELLATION_CHARGE, CancellationReason, REFUND_PROCESSING_TIME, RefundQuote,
    StoredBooking, bucket_by_type, merge_booking_lists, refund_quote,
};
pub use record::{
    BecknTrace, BookingMetadata, BookingRecord, BookingStatus, BookingType, Passenger,
    PassengerForm, PaymentStatus, SearchContext, UnknownBookingType, coerce_amount,
};
pub use reference::{BookingReference, BookingReferenceValidationError};
