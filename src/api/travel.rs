//! Travel highlight endpoints.

use axum::extract::{Path, Query, State};
use serde::Serialize;

use super::{loaded, success, ApiResult, LangQuery};
use crate::errors::AppError;
use crate::models::MainPageLocation;
use crate::view::sanitize::sanitize_opt;
use crate::view::travel::TravelRoute;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TravelHighlightView {
    #[serde(flatten)]
    pub location: MainPageLocation,
    pub title: String,
    pub href: String,
}

impl From<MainPageLocation> for TravelHighlightView {
    fn from(mut location: MainPageLocation) -> Self {
        sanitize_opt(&mut location.story);
        Self {
            title: location.display_name(),
            href: TravelRoute::of(&location).path(),
            location,
        }
    }
}

/// GET /api/travel-highlights - All highlights.
pub async fn list_travel_highlights(
    State(state): State<AppState>,
    Query(lang): Query<LangQuery>,
) -> ApiResult<Vec<TravelHighlightView>> {
    let lang = lang.resolve(&state.config.default_lang);
    let locations = loaded(state.queries.travel_highlights(&lang).await)?;
    success(locations.into_iter().map(TravelHighlightView::from).collect())
}

/// GET /api/travel-highlights/{country} - Country-level highlight.
pub async fn get_country_highlight(
    State(state): State<AppState>,
    Path(country): Path<String>,
    Query(lang): Query<LangQuery>,
) -> ApiResult<TravelHighlightView> {
    highlight(&state, TravelRoute::new(&country, None), &lang).await
}

/// GET /api/travel-highlights/{country}/{place} - Place highlight.
pub async fn get_place_highlight(
    State(state): State<AppState>,
    Path((country, place)): Path<(String, String)>,
    Query(lang): Query<LangQuery>,
) -> ApiResult<TravelHighlightView> {
    highlight(&state, TravelRoute::new(&country, Some(&place)), &lang).await
}

async fn highlight(
    state: &AppState,
    route: Option<TravelRoute>,
    lang: &LangQuery,
) -> ApiResult<TravelHighlightView> {
    let route = route.ok_or_else(|| AppError::NotFound("No such travel highlight".to_string()))?;
    let lang = lang.resolve(&state.config.default_lang);

    let location = loaded(
        state
            .queries
            .travel_highlight(&route.country, route.place.as_deref(), &lang)
            .await,
    )?;
    success(TravelHighlightView::from(location))
}
