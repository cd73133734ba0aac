use super::Services;
use crate::errors::ApiError;
use crate::models::{BackgroundImage, UserProfile};

impl Services {
    /// GET profile/. A 404 resolves to [`UserProfile::placeholder`].
    pub async fn fetch_profile(&self, lang: &str) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = match self.client.get_json("profile/", &[], Some(lang)).await {
            Ok(profile) => profile,
            Err(ApiError::NotFound { .. }) => {
                tracing::info!("No profile published, using placeholder");
                return Ok(UserProfile::placeholder());
            }
            Err(e) => return Err(e),
        };

        Ok(UserProfile {
            avatar: self.media_opt(profile.avatar),
            about_me_image: self.media_opt(profile.about_me_image),
            ..profile
        })
    }

    /// GET background/. A 404 resolves to `None`.
    pub async fn fetch_background(&self, lang: &str) -> Result<Option<BackgroundImage>, ApiError> {
        let background: Option<BackgroundImage> =
            match self.client.get_json("background/", &[], Some(lang)).await {
                Ok(background) => background,
                Err(ApiError::NotFound { .. }) => {
                    tracing::info!("No background published");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };

        Ok(background
            .filter(|bg| !bg.url.trim().is_empty())
            .map(|bg| BackgroundImage {
                url: self.media(&bg.url),
            }))
    }
}
