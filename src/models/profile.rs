//! Profile and background models.

use serde::{Deserialize, Serialize};

/// Link to one of the owner's social accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub platform: String,
    pub url: String,
}

/// The site owner's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub about_me_image: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub profiles: Vec<SocialProfile>,
}

impl UserProfile {
    /// Profile shown when the API has none.
    pub fn placeholder() -> Self {
        Self {
            first_name: "Portfolio".to_string(),
            last_name: "Owner".to_string(),
            bio: None,
            avatar: None,
            about_me_image: None,
            contact_email: None,
            profiles: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Hero background image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub url: String,
}
