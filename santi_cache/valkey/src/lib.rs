use std::time::Duration;

use anyhow::Context;
use bb8_redis::{bb8::Pool, redis, RedisConnectionManager};
use santi_cache_contracts::{CacheService, CounterHit};

/// Counter store shared by all instances of a multi-instance deployment.
#[derive(Debug, Clone)]
pub struct ValkeyCache {
    pool: Pool<RedisConnectionManager>,
}

#[derive(Debug)]
pub struct ValkeyCacheConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl ValkeyCache {
    pub async fn connect(config: &ValkeyCacheConfig) -> anyhow::Result<Self> {
        let manager = RedisConnectionManager::new(config.url.as_str())?;
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(config.min_connections)
            .connection_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .build(manager)
            .await?;

        Ok(Self { pool })
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to acquire cache connection")?;
        let (): () = redis::cmd("FLUSHDB")
            .query_async(&mut *conn)
            .await
            .context("Failed to execute FLUSHDB command")?;
        Ok(())
    }
}

impl CacheService for ValkeyCache {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn increment(&self, key: &str, window: Duration) -> anyhow::Result<CounterHit> {
        let window_ms = u64::try_from(window.as_millis())?.max(1);

        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to acquire cache connection")?;

        // SET NX only creates the counter (and its expiry) if it does not exist
        // yet, so the window starts with the first hit.
        let (count, ttl_ms): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("PX")
            .arg(window_ms)
            .arg("NX")
            .ignore()
            .cmd("INCR")
            .arg(key)
            .cmd("PTTL")
            .arg(key)
            .query_async(&mut *conn)
            .await
            .context("Failed to increment counter in cache")?;

        Ok(CounterHit {
            count,
            expires_in: u64::try_from(ttl_ms)
                .map(Duration::from_millis)
                .unwrap_or(window),
        })
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to acquire cache connection")?;

        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .context("Failed to ping cache")?;
        Ok(())
    }
}
