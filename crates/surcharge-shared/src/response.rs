//! Standard error body returned on every failure path.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Format of [`ErrorResponse::timestamp`].
pub const ERROR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Error body: `{message, details, timestamp, path}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short, stable summary of the failure kind.
    pub message: String,
    /// Human-readable explanation of this occurrence.
    pub details: String,
    /// UTC wall-clock time, `yyyy-MM-dd HH:mm:ss`.
    pub timestamp: String,
    /// Request path that failed.
    pub path: String,
}

impl ErrorResponse {
    pub fn new(
        message: impl Into<String>,
        details: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            details: details.into(),
            timestamp: Utc::now().format(ERROR_TIMESTAMP_FORMAT).to_string(),
            path: path.into(),
        }
    }

    pub fn too_many_requests(path: impl Into<String>) -> Self {
        Self::new("Too many requests", "Rate limit exceeded", path)
    }
}
