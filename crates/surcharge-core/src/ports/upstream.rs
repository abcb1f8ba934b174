//! Upstream percentage source port.

use async_trait::async_trait;

/// Source of truth for the percentage applied to every calculation.
#[async_trait]
pub trait PercentageProvider: Send + Sync {
    /// Fetch the current percentage. One call is one attempt; retrying is the
    /// caller's job.
    async fn fetch_percentage(&self) -> Result<f64, UpstreamError>;
}

/// Upstream call failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}
