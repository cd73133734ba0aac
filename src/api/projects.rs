//! Projects endpoint.

use axum::extract::{Query, State};
use serde::Serialize;

use super::{loaded, success, ApiResult, LangQuery};
use crate::models::Project;
use crate::view::sanitize::sanitize_opt;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub cover_url: Option<String>,
}

/// GET /api/projects - Programming projects.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(lang): Query<LangQuery>,
) -> ApiResult<Vec<ProjectView>> {
    let lang = lang.resolve(&state.config.default_lang);
    let projects = loaded(state.queries.projects(&lang).await)?;

    let views = projects
        .into_iter()
        .map(|mut project| {
            sanitize_opt(&mut project.description);
            ProjectView {
                cover_url: project.cover_image().map(|img| img.url.clone()),
                project,
            }
        })
        .collect();

    success(views)
}
