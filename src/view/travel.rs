//! Travel highlight routes: `/travel-highlights/:country/:place?`.

use serde::Serialize;

use crate::models::MainPageLocation;
use crate::services::segment;

const ROUTE_PREFIX: &str = "travel-highlights";

/// A travel highlight detail page address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelRoute {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

impl TravelRoute {
    /// Route for already-decoded segments.
    ///
    /// Blank segments and segments containing `/` do not name a highlight.
    pub fn new(country: &str, place: Option<&str>) -> Option<Self> {
        let country = valid_segment(country)?;
        let place = match place {
            Some(place) => Some(valid_segment(place)?),
            None => None,
        };
        Some(Self { country, place })
    }

    /// Route of the detail page for `location`.
    pub fn of(location: &MainPageLocation) -> Self {
        Self {
            country: location.country_slug.clone(),
            place: location
                .place_slug
                .clone()
                .filter(|slug| !slug.is_empty()),
        }
    }

    /// Site path with each segment percent-encoded.
    pub fn path(&self) -> String {
        match &self.place {
            Some(place) => format!("/{}/{}/{}", ROUTE_PREFIX, segment(&self.country), segment(place)),
            None => format!("/{}/{}", ROUTE_PREFIX, segment(&self.country)),
        }
    }
}

fn valid_segment(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return None;
    }
    Some(trimmed.to_string())
}
