//! The `context` half of a Beckn envelope.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::domain::BookingType;

/// Beckn core version spoken by this client.
pub const CORE_VERSION: &str = "1.1.0";
/// Country code sent in every context.
pub const COUNTRY: &str = "IND";
/// City code sent in every context.
pub const CITY: &str = "std:080";
/// Message time-to-live.
pub const TTL: &str = "PT30S";

const ID_SUFFIX_LEN: usize = 9;

/// Who is sending: the buyer application's id and callback URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BapIdentity {
    /// Subscriber id registered with the network.
    pub bap_id: String,
    /// Callback base URI.
    pub bap_uri: Url,
}

impl BapIdentity {
    /// Identity for `bap_id` served at `bap_uri`.
    pub fn new(bap_id: impl Into<String>, bap_uri: Url) -> Self {
        Self {
            bap_id: bap_id.into(),
            bap_uri,
        }
    }

    fn uri(&self) -> String {
        self.bap_uri.as_str().trim_end_matches('/').to_owned()
    }
}

/// Beckn action named in the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BecknAction {
    /// Choose an item and request a quote.
    Select,
    /// Place the order.
    Confirm,
    /// Ask for the order's state.
    Status,
}

impl BecknAction {
    /// Wire name, also the endpoint path segment.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Confirm => "confirm",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for BecknAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network domain of the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BecknDomain {
    /// Flights, buses, and trains.
    Mobility,
    /// Hotels and experiences.
    Hospitality,
}

impl From<BookingType> for BecknDomain {
    fn from(kind: BookingType) -> Self {
        if kind.is_mobility() {
            Self::Mobility
        } else {
            Self::Hospitality
        }
    }
}

/// Routing and correlation data for one Beckn message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BecknContext {
    pub domain: BecknDomain,
    pub country: String,
    pub city: String,
    pub action: BecknAction,
    pub core_version: String,
    pub bap_id: String,
    pub bap_uri: String,
    /// Correlates every message of one transaction.
    pub transaction_id: String,
    /// Unique per message.
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub ttl: String,
}

impl BecknContext {
    /// Fresh context with new transaction and message ids.
    pub fn new(
        identity: &BapIdentity,
        domain: BecknDomain,
        action: BecknAction,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            domain,
            country: COUNTRY.to_owned(),
            city: CITY.to_owned(),
            action,
            core_version: CORE_VERSION.to_owned(),
            bap_id: identity.bap_id.clone(),
            bap_uri: identity.uri(),
            transaction_id: correlation_id("txn", now),
            message_id: correlation_id("msg", now),
            timestamp: now,
            ttl: TTL.to_owned(),
        }
    }
}

/// `<prefix>-<epoch millis>-<9 random base-16 chars>`.
fn correlation_id(prefix: &str, now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let suffix = random.get(..ID_SUFFIX_LEN).unwrap_or(&random);
    format!("{prefix}-{}-{suffix}", now.timestamp_millis())
}
