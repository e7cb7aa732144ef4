//! Runtime configuration loaded via OrthoConfig.
//!
//! Every value can be set through `PEERDESK_*` environment variables or a
//! configuration file; unset values fall back to the local development
//! endpoints.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{BapIdentity, DEFAULT_PAYMENT_DELAY};
use crate::telemetry::{LogFormat, UnknownLogFormat};

const DEFAULT_STATE_API_URL: &str = "http://localhost:3001";
const DEFAULT_BAP_URL: &str = "http://localhost:8081";
const DEFAULT_BAP_ID: &str = "travel-discovery-bap.example.com";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A URL setting does not parse.
    #[error("{field} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Rejected text.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The log format is neither `json` nor `pretty`.
    #[error(transparent)]
    LogFormat(#[from] UnknownLogFormat),
}

/// Endpoints, timeouts, and presentation settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PEERDESK")]
pub struct PeerdeskSettings {
    /// Base URL of the dashboard state API.
    pub state_api_url: Option<String>,
    /// Base URL of the Beckn buyer application.
    pub bap_url: Option<String>,
    /// Subscriber id sent in Beckn contexts.
    pub bap_id: Option<String>,
    /// Timeout for every outbound request, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Simulated payment delay, in milliseconds.
    pub payment_delay_ms: Option<u64>,
    /// `json` or `pretty`.
    pub log_format: Option<String>,
}

fn parse_url(field: &'static str, value: Option<&str>, fallback: &str) -> Result<Url, SettingsError> {
    let value = value.unwrap_or(fallback);
    Url::parse(value).map_err(|source| SettingsError::InvalidUrl {
        field,
        value: value.to_owned(),
        source,
    })
}

impl PeerdeskSettings {
    /// State API base URL.
    pub fn state_api_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "state_api_url",
            self.state_api_url.as_deref(),
            DEFAULT_STATE_API_URL,
        )
    }

    /// Beckn buyer application base URL.
    pub fn bap_url(&self) -> Result<Url, SettingsError> {
        parse_url("bap_url", self.bap_url.as_deref(), DEFAULT_BAP_URL)
    }

    /// Identity sent in Beckn contexts.
    pub fn bap_identity(&self) -> Result<BapIdentity, SettingsError> {
        let bap_id = self.bap_id.as_deref().unwrap_or(DEFAULT_BAP_ID);
        Ok(BapIdentity::new(bap_id, self.bap_url()?))
    }

    /// Outbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }

    /// Delay applied by the payment simulator.
    pub fn payment_delay(&self) -> Duration {
        self.payment_delay_ms
            .map_or(DEFAULT_PAYMENT_DELAY, Duration::from_millis)
    }

    /// Log output format.
    pub fn log_format(&self) -> Result<LogFormat, SettingsError> {
        self.log_format
            .as_deref()
            .map_or(Ok(LogFormat::default()), str::parse)
            .map_err(SettingsError::from)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "PEERDESK_STATE_API_URL",
        "PEERDESK_BAP_URL",
        "PEERDESK_BAP_ID",
        "PEERDESK_REQUEST_TIMEOUT_SECS",
        "PEERDESK_PAYMENT_DELAY_MS",
        "PEERDESK_LOG_FORMAT",
    ];

    fn load_from_empty_args() -> PeerdeskSettings {
        PeerdeskSettings::load_from_iter([OsString::from("peerdesk")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.state_api_url().expect("default url").as_str(),
            "http://localhost:3001/"
        );
        let identity = settings.bap_identity().expect("default identity");
        assert_eq!(identity.bap_id, "travel-discovery-bap.example.com");
        assert_eq!(identity.bap_uri.as_str(), "http://localhost:8081/");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.payment_delay(), Duration::from_millis(3000));
        assert_eq!(settings.log_format().expect("default format"), LogFormat::Pretty);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PEERDESK_STATE_API_URL", Some("https://state.example.com/desk".to_owned())),
            ("PEERDESK_BAP_URL", Some("https://bap.example.com".to_owned())),
            ("PEERDESK_BAP_ID", Some("bap.example.com".to_owned())),
            ("PEERDESK_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
            ("PEERDESK_PAYMENT_DELAY_MS", Some("0".to_owned())),
            ("PEERDESK_LOG_FORMAT", Some("json".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.state_api_url().expect("url").as_str(),
            "https://state.example.com/desk"
        );
        assert_eq!(settings.bap_identity().expect("identity").bap_id, "bap.example.com");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.payment_delay(), Duration::ZERO);
        assert_eq!(settings.log_format().expect("format"), LogFormat::Json);
    }

    #[rstest]
    fn malformed_urls_are_reported_with_their_field() {
        let settings = PeerdeskSettings {
            bap_url: Some("not a url".to_owned()),
            ..PeerdeskSettings::default()
        };
        let err = settings.bap_identity().expect_err("invalid url");
        assert!(err.to_string().starts_with("bap_url is not a valid URL"));
    }
}
