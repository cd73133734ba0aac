//! Contact form models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A contact form submission.
///
/// `honeypot` is hidden from human visitors and must stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactFormData {
    #[validate(length(min = 2, message = "Name must be at least 2 characters long."))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 5, message = "Subject must be at least 5 characters long."))]
    pub subject: String,
    #[validate(length(min = 10, message = "Message must be at least 10 characters long."))]
    pub message: String,
    #[serde(default)]
    pub honeypot: String,
}

impl ContactFormData {
    /// Copy with surrounding whitespace removed from every visible field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            honeypot: self.honeypot.clone(),
        }
    }
}

/// Reply of the contact endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub message: Option<String>,
}
