use std::{future::Future, net::IpAddr, time::Duration};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Counts one request of `client` against `policy`.
    fn hit(
        &self,
        policy: RateLimitPolicy,
        client: IpAddr,
    ) -> impl Future<Output = anyhow::Result<RateLimitDecision>> + Send;
}

/// Allows at most `max_requests` requests per client within a fixed `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Name used to separate the counters of different policies.
    pub name: &'static str,
    pub max_requests: u64,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Time until the current window ends.
    pub reset_after: Duration,
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_hit(
        mut self,
        policy: RateLimitPolicy,
        client: IpAddr,
        result: RateLimitDecision,
    ) -> Self {
        self.expect_hit()
            .once()
            .with(
                mockall::predicate::eq(policy),
                mockall::predicate::eq(client),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }
}
