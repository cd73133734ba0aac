//! Site chrome: profile, background and analytics state.

use axum::extract::{Query, State};
use serde::Serialize;

use super::{loaded, success, ApiResult, LangQuery};
use crate::models::{BackgroundImage, UserProfile};
use crate::view::sanitize::sanitize_opt;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteView {
    pub profile: UserProfile,
    pub full_name: String,
    pub background: Option<BackgroundImage>,
    pub consent: Option<bool>,
    pub analytics_id: Option<String>,
}

/// GET /api/site - Data every page needs on first load.
pub async fn get_site(
    State(state): State<AppState>,
    Query(params): Query<LangQuery>,
) -> ApiResult<SiteView> {
    let lang = params.resolve(&state.config.default_lang);

    let (profile, background) = tokio::join!(
        state.queries.profile(&lang),
        state.queries.background(&lang),
    );
    let mut profile = loaded(profile)?;
    let background = loaded(background)?;
    sanitize_opt(&mut profile.bio);

    let consent = state.consent.current();
    let analytics_id = state
        .config
        .analytics
        .tracking_id_for(consent)
        .map(str::to_string);

    success(SiteView {
        full_name: profile.full_name(),
        profile,
        background,
        consent,
        analytics_id,
    })
}
