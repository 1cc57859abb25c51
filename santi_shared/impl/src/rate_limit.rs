use std::net::IpAddr;

use anyhow::Context;
use santi_cache_contracts::{CacheService, CounterHit};
use santi_shared_contracts::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimitService};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct RateLimitServiceImpl<Cache> {
    cache: Cache,
}

impl<Cache> RateLimitServiceImpl<Cache> {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

impl<Cache> RateLimitService for RateLimitServiceImpl<Cache>
where
    Cache: CacheService,
{
    async fn hit(
        &self,
        policy: RateLimitPolicy,
        client: IpAddr,
    ) -> anyhow::Result<RateLimitDecision> {
        let CounterHit { count, expires_in } = self
            .cache
            .increment(&cache_key(policy, client), policy.window)
            .await
            .context("Failed to increment rate limit counter")?;

        trace!(policy = policy.name, %client, count, "rate limit hit");

        Ok(RateLimitDecision {
            allowed: count <= policy.max_requests,
            limit: policy.max_requests,
            remaining: policy.max_requests.saturating_sub(count),
            reset_after: expires_in,
        })
    }
}

fn cache_key(policy: RateLimitPolicy, client: IpAddr) -> String {
    format!("rate_limit:{}:{client}", policy.name)
}
