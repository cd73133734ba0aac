use super::{query_pairs, segment, Services};
use crate::errors::ApiError;
use crate::models::{AstroImage, Category, Tag};

impl Services {
    /// GET astroimages/, optionally filtered by category and tag.
    pub async fn fetch_astro_images(
        &self,
        filter: Option<&str>,
        tag: Option<&str>,
        lang: &str,
    ) -> Result<Vec<AstroImage>, ApiError> {
        let query = query_pairs(&[("filter", filter), ("tag", tag)]);
        let images: Vec<AstroImage> = self
            .client
            .get_json("astroimages/", &query, Some(lang))
            .await?;
        Ok(images.into_iter().map(|img| self.resolve_image(img)).collect())
    }

    /// GET astroimages/{slug}/.
    pub async fn fetch_astro_image(&self, slug: &str, lang: &str) -> Result<AstroImage, ApiError> {
        let path = format!("astroimages/{}/", segment(slug));
        let image = self.client.get_json(&path, &[], Some(lang)).await?;
        Ok(self.resolve_image(image))
    }

    /// GET tags/, counted within the given category.
    pub async fn fetch_tags(&self, filter: Option<&str>, lang: &str) -> Result<Vec<Tag>, ApiError> {
        let query = query_pairs(&[("filter", filter)]);
        self.client.get_json("tags/", &query, Some(lang)).await
    }

    /// GET categories/.
    pub async fn fetch_categories(&self, lang: &str) -> Result<Vec<Category>, ApiError> {
        self.client.get_json("categories/", &[], Some(lang)).await
    }

    fn resolve_image(&self, image: AstroImage) -> AstroImage {
        AstroImage {
            url: self.media(&image.url),
            thumbnail_url: self.media_opt(image.thumbnail_url),
            ..image
        }
    }
}
