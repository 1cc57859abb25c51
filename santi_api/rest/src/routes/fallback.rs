use std::path::Path;

use axum::{
    extract::Request,
    http::{header::CACHE_CONTROL, HeaderValue, Method, StatusCode},
    response::Response,
    routing, Router,
};
use santi_models::environment::Environment;
use tower::ServiceExt;
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeader,
};

use crate::errors::error;

pub const API_NOT_FOUND: &str = "Endpoint API non trovato.";

/// Serves the website from `static_dir`. Unknown paths outside of `/api`
/// receive the `index.html` page with status 404, whatever the method.
pub fn router(static_dir: &Path, environment: Environment) -> Router<()> {
    let cache_control = if environment.is_production() {
        HeaderValue::from_static("public, max-age=86400")
    } else {
        HeaderValue::from_static("public, max-age=0")
    };

    let static_files = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")).map_request(as_get));

    Router::new()
        .route("/api", routing::any(api_not_found))
        .route("/api/", routing::any(api_not_found))
        .route("/api/*path", routing::any(api_not_found))
        .fallback_service(SetResponseHeader::overriding(
            static_files,
            CACHE_CONTROL,
            cache_control,
        ))
}

/// The landing page is sent for every method, only `HEAD` omits the body.
fn as_get(mut request: Request) -> Request {
    if request.method() != Method::HEAD {
        *request.method_mut() = Method::GET;
    }
    request
}

pub async fn api_not_found() -> Response {
    error(StatusCode::NOT_FOUND, API_NOT_FOUND)
}
