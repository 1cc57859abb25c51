use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use santi_core_contact_contracts::{
    ContactFeatureService, ContactSubmitError, RateLimitExceeded,
};

use super::fallback::api_not_found;
use crate::{
    errors::{error, internal_server_error},
    extractors::contact_form::ContactFormBody,
    middlewares::{client_ip::ClientIp, rate_limit::RateLimitHeaders},
    models::ApiResponse,
};

pub const SUCCESS: &str = "Messaggio inviato correttamente!";
pub const CONSENT_MISSING: &str = "È necessario accettare l'informativa sulla privacy.";
pub const TOO_MANY_SUBMISSIONS: &str = "Hai inviato troppi messaggi. Riprova tra un'ora.";

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route(
            "/api/contatti",
            routing::post(submit).fallback(api_not_found),
        )
        .with_state(service)
}

async fn submit(
    service: State<Arc<impl ContactFeatureService>>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    ContactFormBody(form): ContactFormBody,
) -> Response {
    match service.submit(client_ip, form).await {
        Ok(()) => Json(ApiResponse::success(SUCCESS)).into_response(),
        Err(ContactSubmitError::RateLimited(RateLimitExceeded { limit, reset_after })) => {
            let headers = RateLimitHeaders {
                limit,
                remaining: 0,
                reset_after,
            };
            let retry_after = headers.reset_secs().to_string();
            (
                [(RETRY_AFTER, retry_after)],
                headers,
                error(StatusCode::TOO_MANY_REQUESTS, TOO_MANY_SUBMISSIONS),
            )
                .into_response()
        }
        Err(ContactSubmitError::Invalid(errors)) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::from(&errors))).into_response()
        }
        Err(ContactSubmitError::ConsentMissing) => {
            error(StatusCode::BAD_REQUEST, CONSENT_MISSING)
        }
        Err(ContactSubmitError::Send) => internal_server_error(anyhow::anyhow!(
            "Failed to send contact message"
        )),
        Err(ContactSubmitError::Other(err)) => internal_server_error(err),
    }
}
