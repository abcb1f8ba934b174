//! Admission control port.

use async_trait::async_trait;
use std::time::Duration;

/// Rate limiter trait - one shared token budget consulted per request.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Try to take one token. Rejections consume nothing.
    async fn try_admit(&self) -> Result<Admission, RateLimitError>;
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub admitted: bool,
    /// Tokens left after this decision.
    pub remaining: u32,
    /// Time until the next token becomes available. Zero when admitted.
    pub retry_after: Duration,
}

impl Admission {
    pub fn admitted(remaining: u32) -> Self {
        Self {
            admitted: true,
            remaining,
            retry_after: Duration::ZERO,
        }
    }

    pub fn rejected(retry_after: Duration) -> Self {
        Self {
            admitted: false,
            remaining: 0,
            retry_after,
        }
    }

    /// Retry hint in whole milliseconds, rounded down.
    pub fn retry_after_millis(&self) -> u64 {
        u64::try_from(self.retry_after.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
