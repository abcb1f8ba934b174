use async_trait::async_trait;
use std::time::Duration;

/// Cache trait - abstraction over key-value backends with expiry (Redis, in-memory).
///
/// Backends report failures instead of hiding them; whether a failed read
/// counts as a miss is up to the caller.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a live value. Expired entries read as `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set a value, expiring after `ttl` when one is given.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
