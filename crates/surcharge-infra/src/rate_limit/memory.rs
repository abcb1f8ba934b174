//! In-memory token bucket using the governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use surcharge_core::ports::{Admission, RateLimitError, RateLimiter};

type DirectRateLimiter<C> = GovernorRateLimiter<NotKeyed, InMemoryState, C, StateInformationMiddleware>;

/// Token bucket configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum tokens the bucket holds.
    pub capacity: u32,
    /// Tokens replenished per `window`.
    pub refill_tokens: u32,
    /// Refill window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            refill_tokens: 3,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: std::env::var("RATE_LIMIT_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.capacity),
            refill_tokens: std::env::var("RATE_LIMIT_REFILL_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.refill_tokens),
            window: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }

    /// GCRA quota equivalent to a greedily refilled bucket: one token every
    /// `window / refill_tokens`, bursting up to `capacity`.
    fn quota(&self) -> Result<Quota, RateLimitError> {
        let capacity = NonZeroU32::new(self.capacity)
            .ok_or_else(|| RateLimitError::InvalidConfig("capacity must be positive".to_string()))?;
        if self.refill_tokens == 0 {
            return Err(RateLimitError::InvalidConfig(
                "refill_tokens must be positive".to_string(),
            ));
        }

        Quota::with_period(self.window / self.refill_tokens)
            .map(|quota| quota.allow_burst(capacity))
            .ok_or_else(|| RateLimitError::InvalidConfig("refill period must be positive".to_string()))
    }
}

/// Process-wide token bucket.
///
/// The bucket state is a single atomic, so concurrent requests contend
/// without locking. Limits are per process, not shared across instances.
pub struct InMemoryRateLimiter<C: Clock = DefaultClock> {
    limiter: DirectRateLimiter<C>,
    clock: C,
}

impl InMemoryRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C: Clock + Clone> InMemoryRateLimiter<C> {
    /// Build a limiter driven by `clock`; tests pass a `FakeRelativeClock`.
    pub fn with_clock(config: &RateLimitConfig, clock: C) -> Result<Self, RateLimitError> {
        let quota = config.quota()?;
        let limiter = GovernorRateLimiter::direct_with_clock(quota, clock.clone())
            .with_middleware::<StateInformationMiddleware>();

        tracing::debug!(
            capacity = config.capacity,
            refill_tokens = config.refill_tokens,
            window_secs = config.window.as_secs(),
            "Token bucket configured"
        );

        Ok(Self { limiter, clock })
    }
}

#[async_trait]
impl<C> RateLimiter for InMemoryRateLimiter<C>
where
    C: Clock + Send + Sync,
    C::Instant: Send + Sync,
{
    async fn try_admit(&self) -> Result<Admission, RateLimitError> {
        match self.limiter.check() {
            Ok(snapshot) => Ok(Admission::admitted(snapshot.remaining_burst_capacity())),
            Err(not_until) => Ok(Admission::rejected(
                not_until.wait_time_from(self.clock.now()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;

    fn limiter(config: RateLimitConfig) -> (InMemoryRateLimiter<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let limiter = InMemoryRateLimiter::with_clock(&config, clock.clone()).unwrap();
        (limiter, clock)
    }

    #[tokio::test]
    async fn test_capacity_then_reject_with_retry_hint() {
        let (limiter, _clock) = limiter(RateLimitConfig::default());

        for expected_remaining in [2, 1, 0] {
            let admission = limiter.try_admit().await.unwrap();
            assert!(admission.admitted);
            assert_eq!(admission.remaining, expected_remaining);
        }

        let rejected = limiter.try_admit().await.unwrap();
        assert!(!rejected.admitted);
        assert!(rejected.retry_after_millis() > 0);
        // One token every 20s with a 3-per-minute refill.
        assert_eq!(rejected.retry_after, Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_rejections_consume_nothing() {
        let (limiter, clock) = limiter(RateLimitConfig::default());
        for _ in 0..3 {
            assert!(limiter.try_admit().await.unwrap().admitted);
        }
        for _ in 0..5 {
            assert!(!limiter.try_admit().await.unwrap().admitted);
        }

        // Rejected calls did not push the next token further out.
        clock.advance(Duration::from_secs(20));
        assert!(limiter.try_admit().await.unwrap().admitted);
        assert!(!limiter.try_admit().await.unwrap().admitted);
    }

    #[tokio::test]
    async fn test_refill_is_greedy_and_bounded_by_capacity() {
        let (limiter, clock) = limiter(RateLimitConfig::default());
        for _ in 0..3 {
            assert!(limiter.try_admit().await.unwrap().admitted);
        }

        // A third of the window returns a single token.
        clock.advance(Duration::from_secs(20));
        assert!(limiter.try_admit().await.unwrap().admitted);
        assert!(!limiter.try_admit().await.unwrap().admitted);

        // A full window later the bucket is back at capacity and no further.
        clock.advance(Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.try_admit().await.unwrap().admitted);
        }
        assert!(!limiter.try_admit().await.unwrap().admitted);
    }

    #[tokio::test]
    async fn test_full_window_restores_capacity() {
        let (limiter, clock) = limiter(RateLimitConfig::default());
        for _ in 0..3 {
            limiter.try_admit().await.unwrap();
        }

        clock.advance(Duration::from_secs(60));
        let first = limiter.try_admit().await.unwrap();
        assert!(first.admitted);
        assert_eq!(first.remaining, 2);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let config = RateLimitConfig {
            capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            InMemoryRateLimiter::new(&config),
            Err(RateLimitError::InvalidConfig(_))
        ));
    }
}
