//! Account identifiers shared by the dashboard and booking APIs.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validation errors returned by [`UserId::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdValidationError {
    /// The input was blank.
    EmptyId,
    /// The input was not a positive integer.
    InvalidId,
}

impl fmt::Display for UserIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a positive integer"),
        }
    }
}

impl std::error::Error for UserIdValidationError {}

/// Numeric account identifier issued by the authentication service.
///
/// The APIs send it either as a JSON number or as a decimal string; both
/// deserialise into the same value, and it always serialises as a number.
///
/// # Examples
/// ```
/// use peerdesk::domain::UserId;
///
/// let id = UserId::parse(" 42 ").expect("decimal ids are accepted");
/// assert_eq!(id.get(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "UserIdRepr", into = "u64")]
pub struct UserId(u64);

impl UserId {
    /// Wrap an already validated identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Parse a decimal identifier, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, UserIdValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserIdValidationError::EmptyId);
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| UserIdValidationError::InvalidId)
    }

    /// Coerce a loosely typed JSON value into an identifier.
    ///
    /// Integers and decimal strings are accepted; fractional numbers are
    /// truncated. Anything else yields `None`.
    pub fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number
                .as_u64()
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|float| float.is_finite() && *float >= 1.0)
                        .map(|float| float.trunc() as u64)
                })
                .map(Self),
            Value::String(text) => Self::parse(text).ok(),
            _ => None,
        }
    }

    /// Access the raw integer.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for u64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserIdRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<UserIdRepr> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: UserIdRepr) -> Result<Self, Self::Error> {
        match value {
            UserIdRepr::Number(id) => Ok(Self(id)),
            UserIdRepr::Text(raw) => Self::parse(&raw),
        }
    }
}
