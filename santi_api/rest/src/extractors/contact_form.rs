use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
    Form, Json,
};
use santi_models::contact::ContactForm;
use tracing::debug;

use crate::{
    errors::error,
    models::contact::{ApiContactForm, ApiContactFormFields},
};

pub const INVALID_FORMAT: &str = "Formato della richiesta non valido.";
pub const PAYLOAD_TOO_LARGE: &str = "La richiesta è troppo grande.";

/// The body of a contact form submission, either json or url encoded.
pub struct ContactFormBody(pub ContactForm);

#[async_trait]
impl<S> FromRequest<S> for ContactFormBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let urlencoded = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|x| x.to_str().ok())
            .is_some_and(|x| x.starts_with("application/x-www-form-urlencoded"));

        let result = if urlencoded {
            Form::<ApiContactFormFields>::from_request(request, state)
                .await
                .map(|Form(form)| form.into())
                .map_err(|rejection| (rejection.status(), rejection.body_text()))
        } else {
            Json::<ApiContactForm>::from_request(request, state)
                .await
                .map(|Json(form)| form.into())
                .map_err(|rejection| (rejection.status(), rejection.body_text()))
        };

        result.map(Self).map_err(|(status, reason)| {
            debug!(%status, %reason, "rejected contact form body");
            match status {
                StatusCode::PAYLOAD_TOO_LARGE => error(status, PAYLOAD_TOO_LARGE),
                _ => error(StatusCode::BAD_REQUEST, INVALID_FORMAT),
            }
        })
    }
}
