use std::time::Duration;

use anyhow::Context;
use santi_cache_contracts::{CacheService, CounterHit};
use santi_cache_memory::MemoryCache;
use santi_cache_valkey::{ValkeyCache, ValkeyCacheConfig};
use santi_config::CacheConfig;
use tokio::task::JoinHandle;

/// The counter store selected by the configuration.
#[derive(Debug, Clone)]
pub enum Cache {
    Memory(MemoryCache),
    Valkey(ValkeyCache),
}

/// Connect to Valkey if a url is configured, otherwise keep the counters in
/// memory.
pub async fn connect(config: &CacheConfig) -> anyhow::Result<Cache> {
    let Some(url) = &config.url else {
        return Ok(Cache::Memory(MemoryCache::new()));
    };

    ValkeyCache::connect(&ValkeyCacheConfig {
        url: url.clone(),
        max_connections: config.max_connections,
        min_connections: config.min_connections,
        acquire_timeout: config.acquire_timeout.into(),
        idle_timeout: config.idle_timeout.map(Into::into),
        max_lifetime: config.max_lifetime.map(Into::into),
    })
    .await
    .map(Cache::Valkey)
    .context("Failed to connect to valkey")
}

impl Cache {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Valkey(_) => "valkey",
        }
    }

    /// Starts removing expired counters in the background. Valkey expires
    /// keys on its own, so nothing is spawned in that case.
    pub fn spawn_purge_task(&self, interval: Duration) -> Option<JoinHandle<()>> {
        match self {
            Self::Memory(cache) => Some(cache.spawn_purge_task(interval)),
            Self::Valkey(_) => None,
        }
    }
}

impl CacheService for Cache {
    async fn increment(&self, key: &str, window: Duration) -> anyhow::Result<CounterHit> {
        match self {
            Self::Memory(cache) => cache.increment(key, window).await,
            Self::Valkey(cache) => cache.increment(key, window).await,
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Memory(cache) => cache.ping().await,
            Self::Valkey(cache) => cache.ping().await,
        }
    }
}
