use super::Services;
use crate::errors::ApiError;
use crate::models::{Project, ProjectImage};

impl Services {
    /// GET projects/.
    pub async fn fetch_projects(&self, lang: &str) -> Result<Vec<Project>, ApiError> {
        let projects: Vec<Project> = self.client.get_json("projects/", &[], Some(lang)).await?;

        Ok(projects
            .into_iter()
            .map(|project| Project {
                images: project
                    .images
                    .into_iter()
                    .map(|img| ProjectImage {
                        url: self.media(&img.url),
                        ..img
                    })
                    .collect(),
                ..project
            })
            .collect())
    }
}
