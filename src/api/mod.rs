//! JSON API consumed by the site's page scripts.
//!
//! Handlers read through the query cache and hand back view-ready data in a
//! `{success, data}` envelope; failures use the error envelope from
//! [`crate::errors`].

mod admin;
mod consent;
mod contact;
mod gallery;
mod projects;
mod site;
mod travel;

pub use admin::*;
pub use consent::*;
pub use contact::*;
pub use gallery::*;
pub use projects::*;
pub use site::*;
pub use travel::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::query::QueryState;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Language selection shared by the read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

impl LangQuery {
    /// Requested language tag, or `default` when absent or malformed.
    ///
    /// Only a bare tag such as `pl` or `pt-BR` is accepted. A header-style
    /// value like `en;q=0.9` is treated as malformed and falls back.
    pub fn resolve(&self, default: &str) -> String {
        match self.lang.as_deref().map(str::trim) {
            Some(tag) if is_language_tag(tag) => tag.to_ascii_lowercase(),
            _ => default.to_string(),
        }
    }
}

fn is_language_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= 16
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Unwrap a settled query into data or the error to render.
pub(crate) fn loaded<T>(state: QueryState<T>) -> Result<T, AppError> {
    match state.into_result() {
        Some(Ok(data)) => Ok(data),
        Some(Err(err)) => Err(AppError::Api(err)),
        None => Err(AppError::Internal("query settled without data".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_resolution() {
        let query = |lang: Option<&str>| LangQuery {
            lang: lang.map(str::to_string),
        };
        assert_eq!(query(None).resolve("en"), "en");
        assert_eq!(query(Some("PL")).resolve("en"), "pl");
        assert_eq!(query(Some("pt-BR")).resolve("en"), "pt-br");
        assert_eq!(query(Some("")).resolve("en"), "en");
        assert_eq!(query(Some("pl;q=0.9")).resolve("en"), "en");
    }
}
