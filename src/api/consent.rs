//! Cookie consent endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentView {
    pub consent: Option<bool>,
    pub analytics_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub accepted: bool,
}

fn view(state: &AppState) -> ConsentView {
    let consent = state.consent.current();
    ConsentView {
        consent,
        analytics_id: state
            .config
            .analytics
            .tracking_id_for(consent)
            .map(str::to_string),
    }
}

/// GET /api/consent - Recorded choice and the analytics id it unlocks.
pub async fn get_consent(State(state): State<AppState>) -> ApiResult<ConsentView> {
    success(view(&state))
}

/// PUT /api/consent - Record accept or decline.
pub async fn put_consent(
    State(state): State<AppState>,
    Json(request): Json<ConsentRequest>,
) -> ApiResult<ConsentView> {
    state
        .consent
        .record(request.accepted)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store consent: {}", e)))?;
    tracing::info!(accepted = request.accepted, "Cookie consent recorded");
    success(view(&state))
}
