//! Route details carried in a train item's `ROUTE` tag group.
//!
//! Items look like
//! `{"tags": [{"code": "ROUTE", "list": [{"code": "FROM", "value": "..."}]}]}`;
//! Beckn 1.1 payloads put the codes under `descriptor.code` instead, and both
//! forms are accepted.

use serde_json::Value;
use station_codes::StationCodeResolver;
use tracing::debug;

use super::item_path::scalar_text;

const ROUTE_TAG: &str = "ROUTE";

/// Fields recovered from the route tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TrainRoute {
    pub(super) origin: Option<String>,
    pub(super) destination: Option<String>,
    pub(super) departure: Option<String>,
    pub(super) arrival: Option<String>,
}

fn tag_code(tag: &Value) -> Option<&str> {
    tag.get("code")
        .and_then(Value::as_str)
        .or_else(|| {
            tag.get("descriptor")
                .and_then(|descriptor| descriptor.get("code"))
                .and_then(Value::as_str)
        })
}

fn entry_value(entries: &[Value], code: &str) -> Option<String> {
    entries
        .iter()
        .find(|entry| tag_code(entry) == Some(code))
        .and_then(|entry| entry.get("value"))
        .and_then(scalar_text)
}

/// Parse the route tags of `item`, resolving stations to city codes.
pub(super) fn parse_train_route(item: &Value, resolver: &dyn StationCodeResolver) -> TrainRoute {
    let Some(entries) = item
        .get("tags")
        .and_then(Value::as_array)
        .and_then(|tags| tags.iter().find(|tag| tag_code(tag) == Some(ROUTE_TAG)))
        .and_then(|route| route.get("list"))
        .and_then(Value::as_array)
    else {
        return TrainRoute::default();
    };

    let resolve = |label: String| {
        let code = resolver.resolve(&label)?;
        debug!(
            station = %label,
            code = code.as_str(),
            source = ?code.source(),
            "resolved station code"
        );
        Some(code.into_string())
    };

    TrainRoute {
        origin: entry_value(entries, "FROM").and_then(&resolve),
        destination: entry_value(entries, "TO").and_then(&resolve),
        departure: entry_value(entries, "DEPARTURE_TIME"),
        arrival: entry_value(entries, "ARRIVAL_TIME"),
    }
}
