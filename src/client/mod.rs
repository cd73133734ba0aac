//! Content API client.
//!
//! A single configured `reqwest` client with a centralized response
//! interceptor: every request goes through [`ApiClient::send`], and every
//! non-2xx response leaves it as exactly one [`ApiError`] kind.

pub mod media;

use std::sync::Arc;

use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::errors::{ApiError, FieldErrors, NON_FIELD_ERRORS};

pub use media::get_media_url;

const NETWORK_MESSAGE: &str = "Network error: no response received from the server";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
const VALIDATION_MESSAGE: &str = "Validation failed";
const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to access this resource";
const SERVER_MESSAGE: &str = "The server encountered an error";
const FALLBACK_MESSAGE: &str = "An unexpected error occurred";
const DECODE_MESSAGE: &str = "Unexpected response format";

/// Configured client for the content API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    media_url: Arc<str>,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("portfolio-site/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_http(http, &config.api_url, &config.media_url))
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_http(http: reqwest::Client, base_url: &str, media_url: &str) -> Self {
        Self {
            http,
            base_url: Arc::from(format!("{}/", base_url.trim_end_matches('/'))),
            media_url: Arc::from(media_url),
        }
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// Resolve a media path against the configured media base.
    pub fn media(&self, path: &str) -> String {
        get_media_url(&self.media_url, path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, lang: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        match lang {
            Some(lang) => builder.header(header::ACCEPT_LANGUAGE, lang),
            None => builder,
        }
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        lang: Option<&str>,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path, lang).query(query);
        let response = self.send(builder, path).await?;
        decode(response, path).await
    }

    /// POST a JSON body and decode the JSON reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B, lang: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path, lang).json(body);
        let response = self.send(builder, path).await?;
        decode(response, path).await
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let result = builder.send().await;
        intercept(result, path).await
    }
}

/// Map the outcome of a request to either a 2xx response or an [`ApiError`].
pub async fn intercept(
    result: Result<Response, reqwest::Error>,
    path: &str,
) -> Result<Response, ApiError> {
    let response = match result {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(path, error = %err, "Content API request got no response");
            return Err(ApiError::Network {
                message: NETWORK_MESSAGE.to_string(),
                cause: Some(Arc::new(err)),
            });
        }
    };

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // A body that is not JSON is treated like an empty one.
    let body: Value = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        Err(_) => Value::Null,
    };

    let err = classify(status, &body);
    if status.is_server_error() {
        tracing::warn!(path, status = status.as_u16(), "Content API server error");
    } else {
        tracing::debug!(path, status = status.as_u16(), kind = ?err.kind(), "Content API rejected request");
    }
    Err(err)
}

/// Classify a non-2xx status and its JSON body.
pub fn classify(status: StatusCode, body: &Value) -> ApiError {
    let code = status.as_u16();
    match code {
        400 => ApiError::Validation {
            message: server_message(body).unwrap_or_else(|| VALIDATION_MESSAGE.to_string()),
            errors: field_errors(body),
        },
        401 | 403 => ApiError::Unauthorized {
            message: server_message(body).unwrap_or_else(|| UNAUTHORIZED_MESSAGE.to_string()),
            status: code,
        },
        404 => ApiError::NotFound {
            message: server_message(body).unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
        },
        500..=599 => ApiError::Server {
            message: SERVER_MESSAGE.to_string(),
            status: code,
        },
        _ => ApiError::Generic {
            message: server_message(body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            status: Some(code),
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|err| ApiError::Network {
        message: NETWORK_MESSAGE.to_string(),
        cause: Some(Arc::new(err)),
    })?;

    // 204 and empty bodies decode as JSON null.
    let parsed = if bytes.is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(&bytes)
    };

    parsed.map_err(|err| {
        tracing::warn!(path, error = %err, "Content API returned an undecodable body");
        ApiError::Generic {
            message: DECODE_MESSAGE.to_string(),
            status: Some(status.as_u16()),
        }
    })
}

/// First string found under the conventional message keys.
fn server_message(body: &Value) -> Option<String> {
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Field to message-list map from a 400 body.
fn field_errors(body: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match body {
        Value::Object(map) => {
            for (field, value) in map {
                let messages = match value {
                    Value::String(msg) => vec![msg.clone()],
                    Value::Array(items) => items.iter().map(message_text).collect(),
                    other => vec![message_text(other)],
                };
                errors.insert(field.clone(), messages);
            }
        }
        Value::Null => {}
        other => {
            errors.insert(NON_FIELD_ERRORS.to_string(), vec![message_text(other)]);
        }
    }

    errors
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
