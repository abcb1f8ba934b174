//! Cache-aside access to the external percentage.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::DomainError;
use crate::ports::{Cache, PercentageProvider};
use crate::services::RetryPolicy;

/// Key under which the percentage is cached.
pub const PERCENTAGE_KEY: &str = "dynamic-percentage";

/// Configuration for [`PercentageCache`].
#[derive(Debug, Clone)]
pub struct PercentageCacheConfig {
    pub key: String,
    /// Lifetime of a cached value, counted from the write.
    pub ttl: Duration,
    pub retry: RetryPolicy,
    /// Allow only one upstream fetch at a time; concurrent misses wait for it
    /// and then read the fresh value from the cache.
    pub single_flight: bool,
}

impl Default for PercentageCacheConfig {
    fn default() -> Self {
        Self {
            key: PERCENTAGE_KEY.to_string(),
            ttl: Duration::from_secs(30 * 60),
            retry: RetryPolicy::default(),
            single_flight: false,
        }
    }
}

/// Percentage lookup that reads through the cache and falls back to the
/// upstream provider on a miss.
pub struct PercentageCache {
    cache: Arc<dyn Cache>,
    upstream: Arc<dyn PercentageProvider>,
    config: PercentageCacheConfig,
    fetch_lock: Option<Mutex<()>>,
}

impl PercentageCache {
    pub fn new(
        cache: Arc<dyn Cache>,
        upstream: Arc<dyn PercentageProvider>,
        config: PercentageCacheConfig,
    ) -> Self {
        let fetch_lock = config.single_flight.then(|| Mutex::new(()));
        Self {
            cache,
            upstream,
            config,
            fetch_lock,
        }
    }

    /// Current percentage, from the cache when fresh, otherwise from upstream.
    ///
    /// Fails only with [`DomainError::ExternalService`] once the upstream has
    /// failed on every attempt; the cache is left untouched in that case.
    pub async fn get_value(&self) -> Result<f64, DomainError> {
        if let Some(value) = self.cached().await {
            return Ok(value);
        }

        match &self.fetch_lock {
            Some(lock) => {
                let _in_flight = lock.lock().await;
                if let Some(value) = self.cached().await {
                    return Ok(value);
                }
                self.fetch_and_store().await
            }
            None => self.fetch_and_store().await,
        }
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend()
    }

    async fn cached(&self) -> Option<f64> {
        let key = self.config.key.as_str();
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<f64>(&raw) {
                Ok(value) => {
                    tracing::debug!(key, value, "Percentage cache hit");
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "Cached percentage is unreadable, refetching");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key, "Percentage cache miss");
                None
            }
            // An unreachable store is handled exactly like an empty one.
            Err(e) => {
                tracing::warn!(
                    key,
                    backend = self.cache.backend(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                None
            }
        }
    }

    async fn fetch_and_store(&self) -> Result<f64, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        let value = self
            .config
            .retry
            .run(|attempt| {
                let upstream = Arc::clone(&upstream);
                async move {
                    tracing::debug!(attempt, "Fetching percentage from upstream");
                    upstream.fetch_percentage().await
                }
            })
            .await
            .map_err(|exhausted| {
                tracing::error!(
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "Upstream percentage service unavailable"
                );
                DomainError::ExternalService {
                    attempts: exhausted.attempts,
                    source: exhausted.last_error,
                }
            })?;

        let encoded =
            serde_json::to_string(&value).map_err(|e| DomainError::Internal(e.to_string()))?;
        if let Err(e) = self
            .cache
            .set(&self.config.key, &encoded, Some(self.config.ttl))
            .await
        {
            tracing::warn!(key = %self.config.key, error = %e, "Failed to cache percentage");
        }

        Ok(value)
    }
}
