//! Contact form validation and submission.
//!
//! Validation runs before any request. A filled honeypot is rejected with the
//! same message a person sees for invalid input and no field detail, so the
//! response does not reveal the bot check. Server-side 400s land in the same
//! channel as local validation errors; 429s get their own outcome.

use serde::Serialize;
use validator::Validate;

use crate::errors::{ApiError, FieldErrors, VALIDATION_COPY};
use crate::models::ContactFormData;
use crate::services::Services;

pub const SENT_MESSAGE: &str = "Thank you for your message! I'll get back to you soon.";

/// Why a form was not submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRejection {
    pub message: String,
    pub errors: FieldErrors,
}

/// Result of a submission attempt.
#[derive(Debug, Clone)]
pub enum ContactOutcome {
    Sent { message: String },
    Invalid(FormRejection),
    RateLimited,
    Failed(ApiError),
}

/// Validate `form`, returning the trimmed copy to submit.
pub fn validate_form(form: &ContactFormData) -> Result<ContactFormData, FormRejection> {
    let form = form.trimmed();

    if !form.honeypot.trim().is_empty() {
        tracing::debug!("Contact submission rejected by honeypot");
        return Err(FormRejection {
            message: VALIDATION_COPY.to_string(),
            errors: FieldErrors::new(),
        });
    }

    match form.validate() {
        Ok(()) => Ok(form),
        Err(validation) => {
            let mut errors = FieldErrors::new();
            for (field, field_errors) in validation.field_errors() {
                let messages = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(message) => message.to_string(),
                        None => err.code.to_string(),
                    })
                    .collect();
                errors.insert(field.to_string(), messages);
            }
            Err(FormRejection {
                message: VALIDATION_COPY.to_string(),
                errors,
            })
        }
    }
}

/// Validate and submit `form`.
pub async fn submit(services: &Services, form: &ContactFormData, lang: &str) -> ContactOutcome {
    let form = match validate_form(form) {
        Ok(form) => form,
        Err(rejection) => return ContactOutcome::Invalid(rejection),
    };

    match services.submit_contact(&form, lang).await {
        Ok(response) => ContactOutcome::Sent {
            message: response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| SENT_MESSAGE.to_string()),
        },
        Err(ApiError::Validation { errors, .. }) => ContactOutcome::Invalid(FormRejection {
            message: VALIDATION_COPY.to_string(),
            errors,
        }),
        Err(err) if err.is_rate_limited() => ContactOutcome::RateLimited,
        Err(err) => ContactOutcome::Failed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ContactFormData {
        ContactFormData {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Print order".to_string(),
            message: "I'd like a print of the Andromeda shot.".to_string(),
            honeypot: String::new(),
        }
    }

    #[test]
    fn test_valid_form_passes_trimmed() {
        let mut form = valid_form();
        form.name = "  Ada  ".to_string();
        let checked = validate_form(&form).unwrap();
        assert_eq!(checked.name, "Ada");
    }

    #[test]
    fn test_short_name_rejected() {
        let mut form = valid_form();
        form.name = "A".to_string();
        let rejection = validate_form(&form).unwrap_err();
        assert_eq!(rejection.message, VALIDATION_COPY);
        assert_eq!(rejection.errors.len(), 1);
        assert_eq!(
            rejection.errors["name"],
            vec!["Name must be at least 2 characters long."]
        );
    }

    #[test]
    fn test_whitespace_does_not_count_toward_length() {
        let mut form = valid_form();
        form.subject = "  Hi   ".to_string();
        assert!(validate_form(&form).unwrap_err().errors.contains_key("subject"));
    }

    #[test]
    fn test_every_rule_reported() {
        let form = ContactFormData {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            subject: "Hey".to_string(),
            message: "Short".to_string(),
            honeypot: String::new(),
        };
        let rejection = validate_form(&form).unwrap_err();
        let fields: Vec<&str> = rejection.errors.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["email", "message", "name", "subject"]);
    }

    #[test]
    fn test_honeypot_looks_like_generic_error() {
        let mut form = valid_form();
        form.honeypot = "http://spam.example".to_string();
        let rejection = validate_form(&form).unwrap_err();
        assert_eq!(rejection.message, VALIDATION_COPY);
        assert!(rejection.errors.is_empty());
    }

    #[test]
    fn test_multibyte_names_count_characters() {
        let mut form = valid_form();
        form.name = "Łu".to_string();
        assert!(validate_form(&form).is_ok());
    }
}
