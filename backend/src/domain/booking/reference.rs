//! Human-facing booking references.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "BK";
const DIGITS_MODULUS: i64 = 100_000_000;

/// Validation errors for [`BookingReference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingReferenceValidationError {
    /// The reference was blank.
    Empty,
    /// The reference contained whitespace or URL-reserved characters.
    InvalidCharacters,
}

impl fmt::Display for BookingReferenceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "booking reference must not be empty"),
            Self::InvalidCharacters => {
                write!(f, "booking reference may only contain letters, digits, '-' or '_'")
            }
        }
    }
}

impl std::error::Error for BookingReferenceValidationError {}

/// Reference shown to the traveller and used in cancel URLs.
///
/// Generated references are `BK` followed by the last eight digits of the
/// creation time in epoch milliseconds, so two bookings in the same
/// millisecond collide; the booking save carries an idempotency key instead
/// of relying on reference uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookingReference(String);

impl BookingReference {
    /// Validate an existing reference.
    pub fn new(raw: impl Into<String>) -> Result<Self, BookingReferenceValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(BookingReferenceValidationError::Empty);
        }
        if !raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(BookingReferenceValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Generate a reference from the booking time.
    pub fn generate(at: DateTime<Utc>) -> Self {
        let digits = at.timestamp_millis().rem_euclid(DIGITS_MODULUS);
        Self(format!("{PREFIX}{digits:08}"))
    }

    /// Borrow the reference text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for BookingReference {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<BookingReference> for String {
    fn from(value: BookingReference) -> Self {
        value.0
    }
}

impl TryFrom<String> for BookingReference {
    type Error = BookingReferenceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
