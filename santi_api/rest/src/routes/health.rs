use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use chrono::SecondsFormat;
use santi_core_health_contracts::{HealthFeatureService, HealthStatus};
use santi_models::environment::Environment;
use serde::Serialize;

use super::fallback::api_not_found;

pub fn router(service: Arc<impl HealthFeatureService>) -> Router<()> {
    Router::new()
        .route(
            "/api/health",
            routing::get(health).fallback(api_not_found),
        )
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    environment: Environment,
    /// Uptime in seconds.
    uptime: u64,
    timestamp: String,
}

async fn health(service: State<Arc<impl HealthFeatureService>>) -> Response {
    let status = service.get_status().await;
    let HealthStatus {
        environment,
        uptime,
        timestamp,
        ..
    } = status;

    let (code, status) = if status.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status,
        environment,
        uptime: uptime.as_secs(),
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    (code, Json(response)).into_response()
}
