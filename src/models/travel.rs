//! Travel highlight models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationImage {
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A travel highlight shown on the main page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainPageLocation {
    #[serde(alias = "pk")]
    pub id: i64,
    pub country: String,
    pub country_slug: String,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub place_slug: Option<String>,
    /// HTML
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub images: Vec<LocationImage>,
}

impl MainPageLocation {
    /// Heading text: "Place, Country" or just the country.
    pub fn display_name(&self) -> String {
        match self.place.as_deref().filter(|s| !s.is_empty()) {
            Some(place) => format!("{}, {}", place, self.country),
            None => self.country.clone(),
        }
    }
}
