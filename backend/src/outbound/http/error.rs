//! Transport and status mapping shared by the HTTP adapters.
//!
//! Every port error enum exposes transport, timeout, and decode failures; how a
//! non-success status is classified differs per port, so each implements
//! [`HttpFailure::from_status`].

use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::ports::{
    BecknGatewayError, BookingRepositoryError, PeerDirectoryError, ResourceDeliveryError,
    SkillMatchSourceError, StateStoreError,
};

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Port error constructible from HTTP failures.
pub(super) trait HttpFailure: Sized + Send {
    fn transport(message: String) -> Self;
    fn timeout(message: String) -> Self;
    fn decode(message: String) -> Self;
    fn from_status(status: StatusCode, message: String) -> Self;
}

macro_rules! impl_http_failure {
    ($error:ty, decode = $decode:path, |$status:ident, $message:ident| $classify:expr) => {
        impl HttpFailure for $error {
            fn transport(message: String) -> Self {
                <$error>::transport(message)
            }

            fn timeout(message: String) -> Self {
                <$error>::timeout(message)
            }

            fn decode(message: String) -> Self {
                $decode(message)
            }

            fn from_status($status: StatusCode, $message: String) -> Self {
                $classify
            }
        }
    };
}

impl_http_failure!(StateStoreError, decode = StateStoreError::decode, |status, message| {
    if status.is_client_error() {
        StateStoreError::rejected(status.as_u16(), message)
    } else {
        StateStoreError::transport(message)
    }
});

impl_http_failure!(PeerDirectoryError, decode = PeerDirectoryError::decode, |status, message| {
    match status {
        StatusCode::NOT_FOUND => PeerDirectoryError::not_found(message),
        _ if status.is_client_error() => PeerDirectoryError::rejected(status.as_u16(), message),
        _ => PeerDirectoryError::transport(message),
    }
});

impl_http_failure!(
    SkillMatchSourceError,
    decode = SkillMatchSourceError::decode,
    |status, message| {
        if status.is_client_error() {
            SkillMatchSourceError::rejected(status.as_u16(), message)
        } else {
            SkillMatchSourceError::transport(message)
        }
    }
);

// Delivery acknowledgements carry no payload worth decoding.
impl_http_failure!(
    ResourceDeliveryError,
    decode = ResourceDeliveryError::transport,
    |status, message| {
        if status.is_client_error() {
            ResourceDeliveryError::rejected(status.as_u16(), message)
        } else {
            ResourceDeliveryError::transport(message)
        }
    }
);

impl_http_failure!(BecknGatewayError, decode = BecknGatewayError::decode, |status, message| {
    if status.is_client_error() {
        BecknGatewayError::rejected(status.as_u16(), message)
    } else {
        BecknGatewayError::transport(message)
    }
});

impl_http_failure!(
    BookingRepositoryError,
    decode = BookingRepositoryError::decode,
    |status, message| {
        match status {
            StatusCode::NOT_FOUND => BookingRepositoryError::not_found(message),
            StatusCode::CONFLICT => BookingRepositoryError::conflict(message),
            _ if status.is_client_error() => {
                BookingRepositoryError::rejected(status.as_u16(), message)
            }
            _ => BookingRepositoryError::transport(message),
        }
    }
);

/// Join `segments` onto the path of `base`, keeping any prefix it carries.
pub(super) fn endpoint<E: HttpFailure>(base: &Url, segments: &[&str]) -> Result<Url, E> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| E::transport(format!("{base} cannot carry a request path")))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

pub(super) fn map_transport_error<E: HttpFailure>(error: reqwest::Error) -> E {
    if error.is_timeout() {
        E::timeout(error.to_string())
    } else {
        E::transport(error.to_string())
    }
}

pub(super) fn map_status_error<E: HttpFailure>(status: StatusCode, body: &[u8]) -> E {
    let detail = error_message(body);
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), detail)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => E::timeout(message),
        _ => E::from_status(status, message),
    }
}

/// Read a response body, mapping non-success statuses through the port's
/// classification.
pub(super) async fn read_body<E: HttpFailure>(response: Response) -> Result<Vec<u8>, E> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error::<E>)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(body.to_vec())
}

pub(super) fn decode_json<T: DeserializeOwned, E: HttpFailure>(body: &[u8]) -> Result<T, E> {
    serde_json::from_slice(body).map_err(|error| {
        E::decode(format!(
            "{error} in body starting {:?}",
            body_preview(body)
        ))
    })
}

pub(super) async fn read_json<T: DeserializeOwned + Send, E: HttpFailure>(
    response: Response,
) -> Result<T, E> {
    let body = read_body::<E>(response).await?;
    decode_json(&body)
}

/// The `error` field of a JSON error body, or a compact preview of the raw
/// body otherwise.
fn error_message(body: &[u8]) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) {
        if let Some(Value::String(error)) = fields.get("error") {
            return error.trim().to_owned();
        }
    }
    body_preview(body)
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::not_found(StatusCode::NOT_FOUND, "NotFound")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn maps_peer_directory_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error: PeerDirectoryError = map_status_error(status, b"{\"error\":\"Already peers\"}");
        assert_eq!(error.kind(), expected);
    }

    #[rstest]
    #[case::not_found(StatusCode::NOT_FOUND, "NotFound")]
    #[case::conflict(StatusCode::CONFLICT, "Conflict")]
    #[case::unprocessable(StatusCode::UNPROCESSABLE_ENTITY, "Rejected")]
    #[case::bad_gateway(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_booking_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error: BookingRepositoryError = map_status_error(status, b"");
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn surfaces_error_field_of_json_bodies() {
        let error: PeerDirectoryError =
            map_status_error(StatusCode::BAD_REQUEST, b"{\"error\":\" Cannot add yourself \"}");
        assert_eq!(
            error,
            PeerDirectoryError::rejected(400_u16, "status 400: Cannot add yourself")
        );
    }

    #[test]
    fn falls_back_to_compact_body_preview() {
        let error: StateStoreError =
            map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"<html>\n  down\n</html>");
        assert_eq!(
            error,
            StateStoreError::transport("status 503: <html> down </html>")
        );
    }

    #[test]
    fn empty_bodies_report_only_the_status() {
        let error: SkillMatchSourceError = map_status_error(StatusCode::FORBIDDEN, b"");
        assert_eq!(error, SkillMatchSourceError::rejected(403_u16, "status 403"));
    }

    #[test]
    fn truncates_long_previews() {
        let body = "x".repeat(PREVIEW_CHAR_LIMIT + 20);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."), "long bodies should be truncated");
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
    }

    #[rstest]
    #[case::bare_host("http://localhost:5000", "http://localhost:5000/api/state/7")]
    #[case::trailing_slash("http://localhost:5000/", "http://localhost:5000/api/state/7")]
    #[case::prefixed("http://gateway.test/desk/", "http://gateway.test/desk/api/state/7")]
    fn endpoint_keeps_base_path(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("base url");
        let url: Url =
            endpoint::<StateStoreError>(&base, &["api", "state", "7"]).expect("endpoint");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn endpoint_escapes_path_segments() {
        let base = Url::parse("http://localhost:3001").expect("base url");
        let url: Url = endpoint::<BookingRepositoryError>(
            &base,
            &["api", "bookings", "email", "a b/c@example.com"],
        )
        .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://localhost:3001/api/bookings/email/a%20b%2Fc@example.com"
        );
    }

    #[test]
    fn endpoint_rejects_opaque_bases() {
        let base = Url::parse("mailto:desk@example.com").expect("base url");
        let error = endpoint::<BecknGatewayError>(&base, &["beckn", "select"])
            .expect_err("opaque urls cannot carry a path");
        assert_eq!(error.kind(), "Transport");
    }

    #[test]
    fn decode_failures_map_to_decode_variant() {
        let error = decode_json::<Vec<u64>, StateStoreError>(b"{oops").expect_err("invalid json");
        assert_eq!(error.kind(), "Decode");
    }
}
