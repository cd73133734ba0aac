//! Contact form endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use super::{success, ApiResult, LangQuery};
use crate::errors::AppError;
use crate::models::ContactFormData;
use crate::view::contact::{submit, ContactOutcome};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ContactSent {
    pub message: String,
}

/// POST /api/contact - Validate and forward a contact form.
pub async fn submit_contact(
    State(state): State<AppState>,
    Query(lang): Query<LangQuery>,
    Json(form): Json<ContactFormData>,
) -> ApiResult<ContactSent> {
    let lang = lang.resolve(&state.config.default_lang);

    match submit(state.queries.services(), &form, &lang).await {
        ContactOutcome::Sent { message } => {
            tracing::info!("Contact message forwarded");
            success(ContactSent { message })
        }
        ContactOutcome::Invalid(rejection) => Err(AppError::Invalid {
            message: rejection.message,
            errors: rejection.errors,
        }),
        ContactOutcome::RateLimited => Err(AppError::RateLimited),
        ContactOutcome::Failed(err) => Err(AppError::Api(err)),
    }
}
