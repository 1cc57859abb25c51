use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use santi_cache_contracts::{CacheService, CounterHit};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::debug;

/// In-process counter store for single instance deployments.
///
/// Each key is locked individually, so increments of different clients never
/// contend with each other.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    counters: Arc<DashMap<String, Counter>>,
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    expires_at: Instant,
}

impl Counter {
    fn start(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            expires_at: now + window,
        }
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all expired counters and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.counters.len();
        self.counters.retain(|_, counter| counter.expires_at > now);
        before.saturating_sub(self.counters.len())
    }

    /// Periodically purges expired counters until the returned task is
    /// aborted.
    pub fn spawn_purge_task(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!(purged, "purged expired rate limit counters");
                }
            }
        })
    }

    fn increment_counter(&self, key: &str, window: Duration) -> CounterHit {
        let now = Instant::now();
        let mut counter = self
            .counters
            .entry(key.to_owned())
            .or_insert_with(|| Counter::start(now, window));

        if counter.expires_at <= now {
            *counter = Counter::start(now, window);
        }
        counter.count += 1;

        CounterHit {
            count: counter.count,
            expires_in: counter.expires_at - now,
        }
    }
}

impl CacheService for MemoryCache {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn increment(&self, key: &str, window: Duration) -> anyhow::Result<CounterHit> {
        Ok(self.increment_counter(key, window))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
