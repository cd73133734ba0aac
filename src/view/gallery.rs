//! Gallery query parameters and the URL-driven image modal.
//!
//! The open modal is not stored anywhere: it is the first image in the loaded
//! list whose slug or numeric id equals the `img` parameter. Opening sets the
//! parameter, closing removes it, so reload and back/forward reproduce it.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::AstroImage;

/// Characters escaped in query values (everything but unreserved ones).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Gallery state carried in the URL query string.
///
/// Deserialized from the query string by axum's `Query` extractor. Unknown
/// keys are ignored and empty values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryParams {
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl GalleryParams {
    /// Render as a query string without the leading `?`; empty when unset.
    pub fn to_query(&self) -> String {
        [("filter", &self.filter), ("tag", &self.tag), ("img", &self.img)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}={}", key, utf8_percent_encode(v, QUERY_VALUE)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Site path of the gallery page for these parameters.
    pub fn href(&self, base_path: &str) -> String {
        let query = self.to_query();
        if query.is_empty() {
            base_path.to_string()
        } else {
            format!("{}?{}", base_path, query)
        }
    }

    /// Parameters with the modal open on `image`.
    pub fn open_modal(&self, image: &AstroImage) -> Self {
        Self {
            img: Some(image.url_key()),
            ..self.clone()
        }
    }

    /// Parameters with the modal closed.
    pub fn close_modal(&self) -> Self {
        Self {
            img: None,
            ..self.clone()
        }
    }

    /// Switch category; the tag and modal belong to the old list and reset.
    pub fn with_filter(&self, filter: Option<&str>) -> Self {
        Self {
            filter: non_empty(filter),
            tag: None,
            img: None,
        }
    }

    /// Switch tag within the current category; the modal resets.
    pub fn with_tag(&self, tag: Option<&str>) -> Self {
        Self {
            filter: self.filter.clone(),
            tag: non_empty(tag),
            img: None,
        }
    }
}

/// The image the modal shows for `img`, if any.
pub fn active_modal_image<'a>(images: &'a [AstroImage], img: Option<&str>) -> Option<&'a AstroImage> {
    let wanted = img.map(str::trim).filter(|v| !v.is_empty())?;
    images
        .iter()
        .find(|image| (!image.slug.is_empty() && image.slug == wanted) || image.id.to_string() == wanted)
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
