use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use santi_cache_contracts::CacheService;
use santi_core_health_contracts::{HealthFeatureService, HealthStatus};
use santi_models::environment::Environment;
use santi_shared_contracts::time::TimeService;
use tokio::{sync::RwLock, time::Instant};
use tracing::error;

#[derive(Debug, Clone)]
pub struct HealthFeatureServiceImpl<Time, Cache> {
    time: Time,
    cache: Cache,
    config: HealthFeatureConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub environment: Environment,
    /// How long the result of a cache ping is reused.
    pub cache_ttl: Duration,
}

#[derive(Debug)]
struct State {
    started_at: Instant,
    cache: RwLock<Option<CachedPing>>,
}

#[derive(Debug)]
struct CachedPing {
    reachable: bool,
    timestamp: DateTime<Utc>,
}

impl<Time, Cache> HealthFeatureServiceImpl<Time, Cache> {
    pub fn new(time: Time, cache: Cache, config: HealthFeatureConfig) -> Self {
        Self {
            time,
            cache,
            config,
            state: Arc::new(State {
                started_at: Instant::now(),
                cache: RwLock::new(None),
            }),
        }
    }
}

impl<Time, Cache> HealthFeatureService for HealthFeatureServiceImpl<Time, Cache>
where
    Time: TimeService,
    Cache: CacheService,
{
    async fn get_status(&self) -> HealthStatus {
        let now = self.time.now();

        HealthStatus {
            environment: self.config.environment,
            uptime: self.state.started_at.elapsed(),
            timestamp: now,
            cache: self.ping_cache(now).await,
        }
    }
}

impl<Time, Cache> HealthFeatureServiceImpl<Time, Cache>
where
    Cache: CacheService,
{
    async fn ping_cache(&self, now: DateTime<Utc>) -> bool {
        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return cached.reachable;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return cached.reachable;
        }

        let reachable = self
            .cache
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping cache: {err}"))
            .is_ok();

        cache_guard
            .insert(CachedPing {
                reachable,
                timestamp: now,
            })
            .reachable
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use santi_cache_contracts::MockCacheService;
    use santi_shared_contracts::time::MockTimeService;

    use super::*;

    const TTL: Duration = Duration::from_secs(10);

    fn make_config() -> HealthFeatureConfig {
        HealthFeatureConfig {
            environment: Environment::Production,
            cache_ttl: TTL,
        }
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, secs).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn ok() {
        // Arrange
        let time = MockTimeService::new().with_now(at(0));
        let cache = MockCacheService::new().with_ping(true);

        let sut = HealthFeatureServiceImpl::new(time, cache, make_config());
        tokio::time::advance(Duration::from_secs(42)).await;

        // Act
        let result = sut.get_status().await;

        // Assert
        assert_eq!(
            result,
            HealthStatus {
                environment: Environment::Production,
                uptime: Duration::from_secs(42),
                timestamp: at(0),
                cache: true,
            }
        );
        assert!(result.is_healthy());
    }

    #[tokio::test]
    async fn cache_unreachable() {
        // Arrange
        let time = MockTimeService::new().with_now(at(0));
        let cache = MockCacheService::new().with_ping(false);

        let sut = HealthFeatureServiceImpl::new(time, cache, make_config());

        // Act
        let result = sut.get_status().await;

        // Assert
        assert!(!result.cache);
        assert!(!result.is_healthy());
    }

    #[tokio::test]
    async fn ping_is_cached_within_ttl() {
        // Arrange
        let mut time = MockTimeService::new();
        let mut seq = mockall::Sequence::new();
        for secs in [0, 9, 10] {
            time.expect_now()
                .once()
                .in_sequence(&mut seq)
                .return_const(at(secs));
        }

        let mut cache = MockCacheService::new();
        cache.expect_ping().times(2).returning(|| {
            Box::pin(std::future::ready(Err(anyhow::anyhow!(
                "connection refused"
            ))))
        });

        let sut = HealthFeatureServiceImpl::new(time, cache, make_config());

        // Act
        let first = sut.get_status().await;
        let second = sut.get_status().await;
        let third = sut.get_status().await;

        // Assert
        assert_eq!(first.timestamp, at(0));
        assert_eq!(second.timestamp, at(9));
        assert_eq!(third.timestamp, at(10));
        assert!(!first.cache && !second.cache && !third.cache);
    }
}
