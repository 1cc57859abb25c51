use std::{net::IpAddr, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponseParts, Response, ResponseParts},
    Router,
};
use santi_shared_contracts::rate_limit::{RateLimitPolicy, RateLimitService};
use tracing::{error, warn};

use super::client_ip::ClientIp;
use crate::errors::error;

pub const TOO_MANY_REQUESTS: &str = "Troppe richieste, riprova più tardi.";

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Counts every request against `policy` and rejects clients exceeding it.
///
/// Requests are let through if the counter store is unavailable.
pub fn add<S: Clone + Send + Sync + 'static, R: RateLimitService>(
    service: Arc<R>,
    policy: RateLimitPolicy,
) -> impl FnOnce(Router<S>) -> Router<S> {
    move |router| {
        router.layer(from_fn(move |request: Request, next: Next| {
            let service = Arc::clone(&service);
            async move { middleware(&*service, policy, request, next).await }
        }))
    }
}

async fn middleware(
    service: &impl RateLimitService,
    policy: RateLimitPolicy,
    request: Request,
    next: Next,
) -> Response {
    let Some(&ClientIp(client_ip)) = request.extensions().get::<ClientIp>() else {
        return next.run(request).await;
    };

    let decision = match service.hit(policy, client_ip).await {
        Ok(decision) => decision,
        Err(err) => {
            error!(%client_ip, "Failed to check rate limit: {err:#}");
            return next.run(request).await;
        }
    };

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        reject(client_ip, policy)
    };

    RateLimitHeaders {
        limit: decision.limit,
        remaining: decision.remaining,
        reset_after: decision.reset_after,
    }
    .insert_missing(response.headers_mut());

    response
}

fn reject(client_ip: IpAddr, policy: RateLimitPolicy) -> Response {
    warn!(%client_ip, policy = policy.name, "too many requests");
    error(StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS)
}

/// The `RateLimit-*` headers describing the state of a client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: u64,
    pub remaining: u64,
    pub reset_after: Duration,
}

impl RateLimitHeaders {
    /// Seconds until the window resets, rounded up.
    pub fn reset_secs(&self) -> u64 {
        self.reset_after.as_secs() + u64::from(self.reset_after.subsec_nanos() > 0)
    }

    fn values(&self) -> [(HeaderName, HeaderValue); 3] {
        [
            (RATELIMIT_LIMIT, self.limit.into()),
            (RATELIMIT_REMAINING, self.remaining.into()),
            (RATELIMIT_RESET, self.reset_secs().into()),
        ]
    }

    /// Inserts the headers unless a more specific limit already set them.
    fn insert_missing(&self, headers: &mut HeaderMap) {
        for (name, value) in self.values() {
            headers.entry(name).or_insert(value);
        }
    }
}

impl IntoResponseParts for RateLimitHeaders {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.headers_mut().extend(self.values());
        Ok(res)
    }
}
