//! Domain primitives, aggregates, and services.
//!
//! Purpose: model the peer skill dashboard and the travel checkout as plain
//! Rust values, with every remote collaborator behind a port in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) and ErrorCode: transport-agnostic failure
//!   payload and its stable category.
//! - DashboardState, migrate_state, and the aggregation and gap functions
//!   behind the dashboard views.
//! - DashboardSession: one user's state bound to the remote store.
//! - BookingRecord, extract_booking, and the booking history helpers.
//! - CheckoutService: payment, Beckn confirm, and booking save.

pub mod aggregation;
pub mod beckn;
pub mod booking;
pub mod checkout;
pub mod error;
pub mod idempotency;
pub mod migration;
pub mod payment;
pub mod peer;
pub mod ports;
pub mod profile;
pub mod resource;
pub mod session;
pub mod skill;
pub mod skill_gap;
pub mod skill_match;
pub mod state;
pub mod task;
pub mod user;

pub use self::aggregation::{
    CompanyBucket, SkillCount, SkillTally, TRENDING_LIMIT, company_buckets, network_tally,
    peer_tally, trending_skills,
};
pub use self::beckn::{
    BapIdentity, BecknAction, BecknContext, BecknDomain, BecknEnvelope, BecknMessage, BecknOrder,
    ConfirmOrder, confirm_request, select_request, status_request,
};
pub use self::booking::{
    BecknTrace, BookingBuckets, BookingExtractor, BookingInput, BookingMetadata, BookingRecord,
    BookingReference, BookingReferenceValidationError, BookingStatus, BookingType,
    CANCELLATION_CHARGE, CancellationReason, ItemFields, Passenger, PassengerForm, PaymentStatus,
    REFUND_PROCESSING_TIME, RefundQuote, SearchContext, StoredBooking, UnknownBookingType,
    bucket_by_type, coerce_amount, extract_booking, merge_booking_lists, refund_quote,
};
pub use self::checkout::{BookingPersistence, CheckoutOutcome, CheckoutRequest, CheckoutService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::idempotency::{IDEMPOTENCY_KEY_HEADER, IdempotencyKey, IdempotencyKeyValidationError};
pub use self::migration::{MigratedState, MigrationError, MigrationReport, migrate_state};
pub use self::payment::{
    CardDetails, DEFAULT_PAYMENT_DELAY, PaymentDetails, PaymentMethod, PaymentReceipt,
    PaymentSimulator, PaymentSleeper, PaymentValidationError, TokioSleeper,
};
pub use self::peer::{Peer, PeerRequest, PeerRequestAction, UserSummary};
pub use self::profile::Profile;
pub use self::resource::{
    EVERYONE_AUTHOR, Resource, ResourceDraft, ResourceFilter, ResourceTarget, SharedResource,
};
pub use self::session::{DashboardSession, PeerNetwork};
pub use self::skill::{SkillEntry, SkillRecord, normalize_skill, parse_skill_list, skill_key};
pub use self::skill_gap::{
    ComparisonRow, GapStatus, SkillGapReport, compute_skill_gap, skill_gap_for,
};
pub use self::skill_match::{MISSING_PREVIEW_LIMIT, MissingPreview, SkillMatch};
pub use self::state::{DashboardState, DashboardStateError};
pub use self::task::{CancellableTask, TaskCancelled};
pub use self::user::{UserId, UserIdValidationError};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use peerdesk::domain::{DomainResult, Error};
///
/// fn remove(index: usize, len: usize) -> DomainResult<usize> {
///     if index >= len {
///         return Err(Error::not_found(format!("peer {index} does not exist")));
///     }
///     Ok(index)
/// }
///
/// assert!(remove(3, 2).is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
