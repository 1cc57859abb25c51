use std::{future::Future, time::Duration};

/// Store for expiring counters, shared by all in-flight requests.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CacheService: Send + Sync + 'static {
    /// Atomically increments the counter stored under `key` and returns its
    /// new value.
    ///
    /// The first increment of a counter starts a window of length `window`.
    /// Once the window has elapsed the counter is gone and the next increment
    /// starts over at 1.
    fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> impl Future<Output = anyhow::Result<CounterHit>> + Send;

    /// Verify the connection to the cache.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterHit {
    /// Value of the counter after the increment.
    pub count: u64,
    /// Time until the counter expires.
    pub expires_in: Duration,
}

#[cfg(feature = "mock")]
impl MockCacheService {
    pub fn with_increment(mut self, key: String, window: Duration, result: CounterHit) -> Self {
        self.expect_increment()
            .once()
            .with(
                mockall::predicate::eq(key),
                mockall::predicate::eq(window),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_ping(mut self, ok: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(if ok {
                Ok(())
            } else {
                Err(anyhow::anyhow!("cache unreachable"))
            }))
        });
        self
    }
}
