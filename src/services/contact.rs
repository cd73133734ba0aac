use super::Services;
use crate::errors::ApiError;
use crate::models::{ContactFormData, ContactResponse};

impl Services {
    /// POST contact/.
    ///
    /// Callers validate the form first; see `view::contact::submit`.
    pub async fn submit_contact(
        &self,
        form: &ContactFormData,
        lang: &str,
    ) -> Result<ContactResponse, ApiError> {
        let response: Option<ContactResponse> =
            self.client.post_json("contact/", form, Some(lang)).await?;
        Ok(response.unwrap_or_default())
    }
}
