use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::{from_fn, Next},
    Router,
};
use santi_models::environment::Environment;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
     style-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net https://fonts.googleapis.com; \
     font-src 'self' https://fonts.gstatic.com https://cdn.jsdelivr.net; \
     img-src 'self' data: blob: https:; \
     connect-src 'self'; \
     frame-src https://www.google.com https://maps.google.com; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'self'; \
     script-src-attr 'none'; \
     upgrade-insecure-requests";

const HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-site"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains";

/// Adds browser security headers to every response. HSTS is only sent in
/// production.
pub fn add<S: Clone + Send + Sync + 'static>(
    environment: Environment,
) -> impl FnOnce(Router<S>) -> Router<S> {
    move |router| {
        router.layer(from_fn(move |request: Request, next: Next| async move {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();

            for &(name, value) in HEADERS {
                headers
                    .entry(HeaderName::from_static(name))
                    .or_insert(HeaderValue::from_static(value));
            }

            if environment.is_production() {
                headers
                    .entry(header::STRICT_TRANSPORT_SECURITY)
                    .or_insert(HeaderValue::from_static(STRICT_TRANSPORT_SECURITY));
            }

            response
        }))
    }
}
