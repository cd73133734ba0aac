//! Error handling module for the portfolio site.
//!
//! Two layers live here:
//! - [`ApiError`], the closed taxonomy produced by the content API client's
//!   response interceptor.
//! - [`AppError`], the error returned by this service's own handlers, which
//!   renders as a JSON envelope carrying user-facing copy only.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field name to list of messages, as returned by the API on a 400.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Field key used when a validation message is not tied to one field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const APP_ERROR: &str = "APP_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Discriminant of [`ApiError`], for branching without matching on fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Network,
    Validation,
    Unauthorized,
    NotFound,
    Server,
    Generic,
}

/// Failure of a request to the content API.
///
/// Values are only built by the client's response interceptor; everything
/// downstream propagates them unchanged or matches on them.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        cause: Option<Arc<reqwest::Error>>,
    },
    /// Status 400 with a field to message-list mapping.
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },
    /// Status 401 or 403.
    #[error("{message}")]
    Unauthorized { message: String, status: u16 },
    /// Status 404.
    #[error("{message}")]
    NotFound { message: String },
    /// Status 5xx.
    #[error("{message}")]
    Server { message: String, status: u16 },
    /// Any other failure, with the server's message or a fallback.
    #[error("{message}")]
    Generic { message: String, status: Option<u16> },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Generic { .. } => ErrorKind::Generic,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Network { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::Unauthorized { message, .. }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. }
            | ApiError::Generic { message, .. } => message,
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Network { .. } => None,
            ApiError::Validation { .. } => Some(400),
            ApiError::Unauthorized { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Generic { status, .. } => *status,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::Generic { status: Some(429), .. })
    }
}

/// Copy shown to visitors for a failed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFacingError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

pub const NETWORK_COPY: &str =
    "We couldn't reach the server. Please check your connection and try again.";
pub const VALIDATION_COPY: &str = "Please correct the highlighted fields and try again.";
pub const UNAUTHORIZED_COPY: &str = "You don't have permission to view this content.";
pub const NOT_FOUND_COPY: &str = "The requested content could not be found.";
pub const SERVER_COPY: &str = "Something went wrong on our side. Please try again later.";
pub const RATE_LIMITED_COPY: &str = "Too many requests. Please wait a moment and try again.";
pub const GENERIC_COPY: &str = "Something went wrong. Please try again.";

impl From<&ApiError> for UserFacingError {
    fn from(err: &ApiError) -> Self {
        let (message, field_errors) = match err {
            ApiError::Network { .. } => (NETWORK_COPY, None),
            ApiError::Validation { errors, .. } => (VALIDATION_COPY, Some(errors.clone())),
            ApiError::Unauthorized { .. } => (UNAUTHORIZED_COPY, None),
            ApiError::NotFound { .. } => (NOT_FOUND_COPY, None),
            ApiError::Server { .. } => (SERVER_COPY, None),
            ApiError::Generic { status: Some(429), .. } => (RATE_LIMITED_COPY, None),
            ApiError::Generic { .. } => (GENERIC_COPY, None),
        };

        Self {
            kind: err.kind(),
            message: message.to_string(),
            field_errors,
        }
    }
}

/// Error returned by this service's handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// A content API request failed
    #[error("upstream: {0}")]
    Api(#[from] ApiError),
    /// Form input failed validation before any request was made
    #[error("invalid form: {message}")]
    Invalid { message: String, errors: FieldErrors },
    /// The visitor is sending too many submissions
    #[error("rate limited")]
    RateLimited,
    /// Route or resource unknown to this service
    #[error("not found: {0}")]
    NotFound(String),
    /// Authentication required
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Bad request
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Api(err) => match err {
                ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
                ApiError::Unauthorized { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::UNAUTHORIZED)
                }
                ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
                ApiError::Generic { status: Some(429), .. } => StatusCode::TOO_MANY_REQUESTS,
                ApiError::Network { .. } | ApiError::Server { .. } | ApiError::Generic { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            },
            AppError::Invalid { .. } => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Api(err) => match err.kind() {
                ErrorKind::Network => codes::NETWORK_ERROR,
                ErrorKind::Validation => codes::VALIDATION_ERROR,
                ErrorKind::Unauthorized => codes::UNAUTHORIZED,
                ErrorKind::NotFound => codes::NOT_FOUND,
                ErrorKind::Server => codes::SERVER_ERROR,
                ErrorKind::Generic if err.is_rate_limited() => codes::RATE_LIMITED,
                ErrorKind::Generic => codes::APP_ERROR,
            },
            AppError::Invalid { .. } => codes::VALIDATION_ERROR,
            AppError::RateLimited => codes::RATE_LIMITED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Message safe to show a visitor.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Api(err) => UserFacingError::from(err).message,
            AppError::Invalid { message, .. } => message.clone(),
            AppError::RateLimited => RATE_LIMITED_COPY.to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(_) => GENERIC_COPY.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        let errors = match self {
            AppError::Api(ApiError::Validation { errors, .. }) => errors,
            AppError::Invalid { errors, .. } => errors,
            _ => return None,
        };
        if errors.is_empty() {
            return None;
        }
        Some(serde_json::json!({ "fieldErrors": errors }))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.public_message(),
                details: error.details(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Api(err @ (ApiError::Network { .. } | ApiError::Server { .. })) => {
                tracing::warn!(error = %err, status = ?err.status_code(), "Content API unavailable");
            }
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }

        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(field: &str, msg: &str) -> ApiError {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![msg.to_string()]);
        ApiError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    #[test]
    fn test_status_codes_per_kind() {
        let net = ApiError::Network {
            message: "no response".to_string(),
            cause: None,
        };
        assert_eq!(net.status_code(), None);
        assert_eq!(net.kind(), ErrorKind::Network);

        assert_eq!(validation("name", "short").status_code(), Some(400));
        assert_eq!(
            ApiError::NotFound {
                message: "gone".to_string()
            }
            .status_code(),
            Some(404)
        );
        assert_eq!(
            ApiError::Server {
                message: "boom".to_string(),
                status: 503
            }
            .status_code(),
            Some(503)
        );
    }

    #[test]
    fn test_user_facing_copy_hides_raw_messages() {
        let err = ApiError::Server {
            message: "Traceback (most recent call last): ...".to_string(),
            status: 500,
        };
        let copy = UserFacingError::from(&err);
        assert_eq!(copy.kind, ErrorKind::Server);
        assert_eq!(copy.message, SERVER_COPY);
        assert!(copy.field_errors.is_none());
    }

    #[test]
    fn test_user_facing_validation_keeps_field_messages() {
        let copy = UserFacingError::from(&validation("email", "Enter a valid email address."));
        assert_eq!(copy.message, VALIDATION_COPY);
        let fields = copy.field_errors.unwrap();
        assert_eq!(fields["email"], vec!["Enter a valid email address."]);
    }

    #[test]
    fn test_rate_limit_copy() {
        let err = ApiError::Generic {
            message: "Request was throttled.".to_string(),
            status: Some(429),
        };
        assert!(err.is_rate_limited());
        assert_eq!(UserFacingError::from(&err).message, RATE_LIMITED_COPY);
        assert_eq!(
            AppError::from(err).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_app_error_envelope() {
        let err = AppError::Api(validation("subject", "Too short"));
        let body = ErrorResponse::new(&err);
        assert!(!body.success);
        assert_eq!(body.error.code, codes::VALIDATION_ERROR);
        assert_eq!(body.error.message, VALIDATION_COPY);
        let details = body.error.details.unwrap();
        assert_eq!(details["fieldErrors"]["subject"][0], "Too short");
    }

    #[test]
    fn test_upstream_failures_map_to_bad_gateway() {
        let err = AppError::Api(ApiError::Server {
            message: "down".to_string(),
            status: 500,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), codes::SERVER_ERROR);

        let err = AppError::Api(ApiError::Unauthorized {
            message: "forbidden".to_string(),
            status: 403,
        });
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
