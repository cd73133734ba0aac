//! Cache administration.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::query::hooks::resources;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    /// Resource to drop; every entry when absent
    #[serde(default)]
    pub resource: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}

/// POST /api/admin/cache/invalidate - Drop cached content after an edit.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Json(request): Json<InvalidateRequest>,
) -> ApiResult<InvalidateResponse> {
    let resource = request.resource.as_deref().filter(|r| !r.is_empty());
    if let Some(resource) = resource {
        if !resources::ALL.contains(&resource) {
            return Err(AppError::BadRequest(format!(
                "Unknown resource '{}'; expected one of: {}",
                resource,
                resources::ALL.join(", ")
            )));
        }
    }

    let removed = state.queries.invalidate(resource);
    tracing::info!(resource = resource.unwrap_or("*"), removed, "Query cache invalidated");
    success(InvalidateResponse { removed })
}
