//! Gallery image models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A piece of equipment, either structured or a bare name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EquipmentItem {
    Detailed {
        #[serde(alias = "model")]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brand: Option<String>,
    },
    Name(String),
}

impl EquipmentItem {
    /// Text shown in the image details panel.
    pub fn label(&self) -> String {
        match self {
            EquipmentItem::Detailed {
                name,
                brand: Some(brand),
            } if !brand.is_empty() => format!("{} {}", brand, name),
            EquipmentItem::Detailed { name, .. } => name.clone(),
            EquipmentItem::Name(name) => name.clone(),
        }
    }
}

/// A gallery photograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstroImage {
    #[serde(alias = "pk")]
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub camera: Vec<EquipmentItem>,
    #[serde(default)]
    pub telescope: Vec<EquipmentItem>,
    #[serde(default)]
    pub tracker: Vec<EquipmentItem>,
    #[serde(default)]
    pub capture_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    /// HTML; sanitized before it is handed to the page
    #[serde(default)]
    pub description: Option<String>,
}

impl AstroImage {
    /// Identifier used in the `img` query parameter: the slug, else the id.
    pub fn url_key(&self) -> String {
        if self.slug.is_empty() {
            self.id.to_string()
        } else {
            self.slug.clone()
        }
    }

    /// Labels of every listed camera, telescope and tracker, in that order.
    pub fn equipment_labels(&self) -> Vec<String> {
        self.camera
            .iter()
            .chain(&self.telescope)
            .chain(&self.tracker)
            .map(EquipmentItem::label)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_accepts_both_shapes() {
        let image: AstroImage = serde_json::from_str(
            r#"{
                "pk": 7,
                "slug": "m31-andromeda",
                "url": "/media/m31.jpg",
                "tags": ["galaxy"],
                "camera": [{"model": "ASI2600MC", "brand": "ZWO"}],
                "telescope": ["RedCat 51"],
                "capture_date": "2024-09-14"
            }"#,
        )
        .unwrap();

        assert_eq!(image.camera[0].label(), "ZWO ASI2600MC");
        assert_eq!(image.telescope[0].label(), "RedCat 51");
        assert!(image.tracker.is_empty());
        assert_eq!(image.capture_date, NaiveDate::from_ymd_opt(2024, 9, 14));
        assert_eq!(image.equipment_labels(), vec!["ZWO ASI2600MC", "RedCat 51"]);
    }

    #[test]
    fn test_url_key_falls_back_to_id() {
        let image: AstroImage =
            serde_json::from_str(r#"{"pk": 42, "url": "https://x.example/a.jpg"}"#).unwrap();
        assert_eq!(image.url_key(), "42");
    }
}
