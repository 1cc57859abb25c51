use santi_core_contact_contracts::{ContactValidationErrors, ContactViolation};
use santi_models::contact::ContactForm;
use serde::Deserialize;
use serde_json::Value;

use super::{ApiFieldError, ApiResponse};

/// A contact form submitted as json. Fields of any json type are accepted
/// here, values that are not strings are treated as missing.
#[derive(Debug, Deserialize)]
pub struct ApiContactForm {
    #[serde(default)]
    pub nome: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub messaggio: Value,
    #[serde(default)]
    pub privacy: Value,
}

/// A contact form submitted as `application/x-www-form-urlencoded`.
#[derive(Debug, Deserialize)]
pub struct ApiContactFormFields {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub messaggio: Option<String>,
    pub privacy: Option<String>,
}

impl From<ApiContactForm> for ContactForm {
    fn from(value: ApiContactForm) -> Self {
        let text = |value: Value| match value {
            Value::String(value) => Some(value),
            _ => None,
        };

        Self {
            privacy_consent: match &value.privacy {
                Value::Bool(accepted) => *accepted,
                Value::String(value) => is_checked(value),
                _ => false,
            },
            name: text(value.nome),
            email: text(value.email),
            message: text(value.messaggio),
        }
    }
}

impl From<ApiContactFormFields> for ContactForm {
    fn from(value: ApiContactFormFields) -> Self {
        Self {
            name: value.nome,
            email: value.email,
            message: value.messaggio,
            privacy_consent: value.privacy.as_deref().is_some_and(is_checked),
        }
    }
}

fn is_checked(value: &str) -> bool {
    matches!(value, "on" | "true")
}

impl From<&ContactValidationErrors> for ApiResponse {
    fn from(value: &ContactValidationErrors) -> Self {
        Self {
            errors: Some(value.iter().map(ApiFieldError::from).collect()),
            ..Self::failure(value.first().message())
        }
    }
}

impl From<&ContactViolation> for ApiFieldError {
    fn from(value: &ContactViolation) -> Self {
        Self {
            field: value.field.as_str(),
            message: value.message(),
        }
    }
}
