//! Configuration module for the portfolio site.
//!
//! Configuration is loaded from environment variables (optionally seeded from a
//! `.env` file). The content API URL is the only required value.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::consent::AnalyticsSettings;

/// Errors raised while resolving configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORTFOLIO_API_URL is not set; the content API base URL is required")]
    MissingApiUrl,
    #[error("{var} must be an absolute http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("PORTFOLIO_BIND_ADDR is not a socket address: {0:?}")]
    InvalidBindAddr(String),
    #[error("PORTFOLIO_REQUEST_TIMEOUT_SECS is not a positive integer: {0:?}")]
    InvalidTimeout(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the content API, always ending in `/`
    pub api_url: String,
    /// Base for relative media paths returned by the API
    pub media_url: String,
    /// Analytics toggle and tracking id
    pub analytics: AnalyticsSettings,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Pre-shared key for the admin endpoints
    pub admin_psk: Option<String>,
    /// File backing the consent key
    pub consent_path: PathBuf,
    /// Language tag used when a request names none
    pub default_lang: String,
    /// Timeout applied to every outgoing request
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_api_url = var("PORTFOLIO_API_URL").ok_or(ConfigError::MissingApiUrl)?;
        let api_url = normalize_base_url("PORTFOLIO_API_URL", &raw_api_url)?;

        let media_url = match var("PORTFOLIO_MEDIA_URL") {
            Some(raw) => normalize_base_url("PORTFOLIO_MEDIA_URL", &raw)?.to_string(),
            None => origin_of(&api_url),
        };
        let api_url = api_url.to_string();

        let analytics = AnalyticsSettings {
            enabled: var("PORTFOLIO_ANALYTICS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            tracking_id: var("PORTFOLIO_ANALYTICS_ID").map(|v| v.trim().to_string()),
        };

        let raw_bind = var("PORTFOLIO_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let bind_addr = raw_bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_bind.clone()))?;

        let log_level = var("PORTFOLIO_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let admin_psk = var("PORTFOLIO_ADMIN_PSK");

        let consent_path = var("PORTFOLIO_CONSENT_PATH")
            .unwrap_or_else(|| "./data/storage.json".to_string())
            .into();

        let default_lang = var("PORTFOLIO_DEFAULT_LANG").unwrap_or_else(|| "en".to_string());

        let request_timeout = match var("PORTFOLIO_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(15),
        };

        Ok(Self {
            api_url,
            media_url,
            analytics,
            bind_addr,
            log_level,
            admin_psk,
            consent_path,
            default_lang,
            request_timeout,
        })
    }
}

/// Parse an absolute http(s) base URL and make its path end with a single `/`.
fn normalize_base_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        var,
        value: raw.to_string(),
    };

    let mut url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }

    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Scheme and authority of `url`, with a trailing `/`.
fn origin_of(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config =
            Config::from_lookup(lookup(&[("PORTFOLIO_API_URL", "https://cms.example.com/api")]))
                .unwrap();

        assert_eq!(config.api_url, "https://cms.example.com/api/");
        assert_eq!(config.media_url, "https://cms.example.com/");
        assert!(!config.analytics.enabled);
        assert!(config.analytics.tracking_id.is_none());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.admin_psk.is_none());
        assert_eq!(config.consent_path, PathBuf::from("./data/storage.json"));
        assert_eq!(config.default_lang, "en");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_missing_api_url_is_fatal() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiUrl));

        let err = Config::from_lookup(lookup(&[("PORTFOLIO_API_URL", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiUrl));
    }

    #[test]
    fn test_relative_api_url_rejected() {
        let err = Config::from_lookup(lookup(&[("PORTFOLIO_API_URL", "/api")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORTFOLIO_API_URL", "http://localhost:8000/api/v1//"),
            ("PORTFOLIO_MEDIA_URL", "https://media.example.com"),
            ("PORTFOLIO_ANALYTICS_ENABLED", "Yes"),
            ("PORTFOLIO_ANALYTICS_ID", " G-TEST123 "),
            ("PORTFOLIO_BIND_ADDR", "0.0.0.0:3000"),
            ("PORTFOLIO_REQUEST_TIMEOUT_SECS", "5"),
            ("PORTFOLIO_DEFAULT_LANG", "pl"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8000/api/v1/");
        assert_eq!(config.media_url, "https://media.example.com/");
        assert!(config.analytics.enabled);
        assert_eq!(config.analytics.tracking_id.as_deref(), Some("G-TEST123"));
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.default_lang, "pl");
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_lookup(lookup(&[
            ("PORTFOLIO_API_URL", "http://localhost:8000/"),
            ("PORTFOLIO_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }

    #[test]
    fn test_unparsable_api_url_rejected() {
        for raw in [
            "https://exa mple.com/api",
            "http://host:notaport/api",
            "http://[::1/api",
            "ftp://files.example.com/",
            "https://",
        ] {
            let err = Config::from_lookup(lookup(&[("PORTFOLIO_API_URL", raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidUrl { .. }), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_unparsable_media_url_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("PORTFOLIO_API_URL", "https://cms.example.com/api"),
            ("PORTFOLIO_MEDIA_URL", "media.example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: "PORTFOLIO_MEDIA_URL", .. }));
    }

    #[test]
    fn test_origin_of() {
        let url = |raw: &str| Url::parse(raw).unwrap();
        assert_eq!(origin_of(&url("http://localhost:8000/api/")), "http://localhost:8000/");
        assert_eq!(origin_of(&url("https://example.com:443/a/b/")), "https://example.com/");
        assert_eq!(origin_of(&url("http://[::1]:9000/api/")), "http://[::1]:9000/");
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        let config = Config::from_lookup(lookup(&[(
            "PORTFOLIO_API_URL",
            "https://cms.example.com/api?format=json#top",
        )]))
        .unwrap();
        assert_eq!(config.api_url, "https://cms.example.com/api/");
    }
}
