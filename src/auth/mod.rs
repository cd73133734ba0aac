//! Admin key guard for the cache administration routes.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Middleware admitting requests that present `expected_psk`.
///
/// With no key configured every request passes.
pub async fn admin_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let verdict = match presented_key(request.headers()) {
        Some(key) if keys_match(key, &expected) => Ok(()),
        Some(_) => Err("Invalid admin key"),
        None => Err("Missing admin key"),
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err(message) => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin request: {}", message);
            AppError::Unauthorized(message.to_string()).into_response()
        }
    }
}

/// Key from `x-admin-key`, else from a bearer `Authorization` header.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let explicit = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    explicit.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    })
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("admin-key-123", "admin-key-123"));
        assert!(!keys_match("admin-key-123", "admin-key-124"));
        assert!(!keys_match("short", "much-longer-key"));
    }

    #[test]
    fn test_admin_header_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("from-header"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(presented_key(&headers), Some("from-header"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(presented_key(&headers), Some("from-bearer"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(presented_key(&headers), None);
    }
}
