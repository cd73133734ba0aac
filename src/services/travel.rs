use super::{segment, Services};
use crate::errors::ApiError;
use crate::models::{LocationImage, MainPageLocation};

impl Services {
    /// GET travel-highlights/.
    pub async fn fetch_travel_highlights(&self, lang: &str) -> Result<Vec<MainPageLocation>, ApiError> {
        let locations: Vec<MainPageLocation> = self
            .client
            .get_json("travel-highlights/", &[], Some(lang))
            .await?;
        Ok(locations.into_iter().map(|loc| self.resolve_location(loc)).collect())
    }

    /// GET travel-highlights/{country}/ or travel-highlights/{country}/{place}/.
    pub async fn fetch_travel_highlight(
        &self,
        country: &str,
        place: Option<&str>,
        lang: &str,
    ) -> Result<MainPageLocation, ApiError> {
        let path = match place.filter(|p| !p.is_empty()) {
            Some(place) => format!("travel-highlights/{}/{}/", segment(country), segment(place)),
            None => format!("travel-highlights/{}/", segment(country)),
        };
        let location = self.client.get_json(&path, &[], Some(lang)).await?;
        Ok(self.resolve_location(location))
    }

    fn resolve_location(&self, location: MainPageLocation) -> MainPageLocation {
        MainPageLocation {
            images: location
                .images
                .into_iter()
                .map(|img| LocationImage {
                    url: self.media(&img.url),
                    thumbnail_url: self.media_opt(img.thumbnail_url),
                    ..img
                })
                .collect(),
            ..location
        }
    }
}
