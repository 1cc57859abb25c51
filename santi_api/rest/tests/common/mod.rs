#![allow(dead_code, reason = "not every test uses every helper")]

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use santi_api_rest::{RestServer, RestServerConfig};
use santi_cache_memory::MemoryCache;
use santi_core_contact_contracts::ContactFeatureService;
use santi_core_contact_impl::{ContactFeatureConfig, ContactFeatureServiceImpl};
use santi_core_health_contracts::HealthFeatureService;
use santi_email_contracts::MockEmailService;
use santi_models::environment::Environment;
use santi_shared_contracts::rate_limit::RateLimitPolicy;
use santi_shared_impl::{rate_limit::RateLimitServiceImpl, time::TimeServiceImpl};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

pub const GENERAL_POLICY: RateLimitPolicy = RateLimitPolicy {
    name: "general",
    max_requests: 300,
    window: Duration::from_secs(180),
};

pub const CONTACT_POLICY: RateLimitPolicy = RateLimitPolicy {
    name: "contact",
    max_requests: 5,
    window: Duration::from_secs(3600),
};

pub const INDEX_HTML: &str = "<!doctype html><title>LA SANTI Gomme srl</title>";
pub const STYLE_CSS: &str = "body { margin: 0; }";

pub type RateLimit = RateLimitServiceImpl<MemoryCache>;
pub type ContactService = ContactFeatureServiceImpl<RateLimit, TimeServiceImpl, MockEmailService>;

pub fn make_static_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(dir.path().join("style.css"), STYLE_CSS).unwrap();
    dir
}

pub fn make_config(static_dir: &Path, environment: Environment) -> RestServerConfig {
    RestServerConfig {
        environment,
        static_dir: static_dir.into(),
        body_limit: 10 * 1024,
        real_ip_config: None,
        rate_limit: GENERAL_POLICY,
    }
}

pub fn make_router(
    health: impl HealthFeatureService,
    contact: impl ContactFeatureService,
    config: RestServerConfig,
) -> Router {
    RestServer::new(
        health,
        contact,
        RateLimitServiceImpl::new(MemoryCache::new()),
        config,
    )
    .router()
}

pub fn make_contact_service(email: MockEmailService) -> ContactService {
    ContactFeatureServiceImpl::new(
        RateLimitServiceImpl::new(MemoryCache::new()),
        TimeServiceImpl,
        email,
        ContactFeatureConfig {
            recipient: "info@example.com".parse().unwrap(),
            timezone: chrono_tz::Europe::Rome,
            send_timeout: Duration::from_secs(10),
            rate_limit: CONTACT_POLICY,
        },
    )
}

pub fn get(uri: &str) -> Request<Body> {
    request(Method::GET, uri, None, Body::empty())
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    request(
        Method::POST,
        uri,
        Some("application/json"),
        Body::from(body.to_string()),
    )
}

pub fn request(
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: Body,
) -> Request<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(CONTENT_TYPE, content_type);
    }
    let mut request = request.body(body).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::new(CLIENT, 54321)));
    request
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|x| x.to_str().unwrap())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        body,
    }
}
