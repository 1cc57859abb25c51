use std::borrow::Cow;

use serde::Serialize;

pub mod contact;

/// The envelope of every json response of the contact api.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiFieldError>>,
}

#[derive(Debug, Serialize)]
pub struct ApiFieldError {
    pub field: &'static str,
    pub message: String,
}

impl ApiResponse {
    pub fn success(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }
}
