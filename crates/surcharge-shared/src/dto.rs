//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Query string of `GET /calculation`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalculationQuery {
    pub number1: f64,
    pub number2: f64,
}

/// Query string of `GET /call-logs`. Pages are zero-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CallLogPageQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

fn default_page_size() -> u64 {
    10
}

impl Default for CallLogPageQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
        }
    }
}

/// Format of [`CallLogResponse::timestamp`].
pub const CALL_LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One recorded call as exposed by `GET /call-logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLogResponse {
    pub id: Option<i64>,
    /// `yyyy-MM-dd HH:mm:ss.SSS`, UTC.
    pub timestamp: String,
    pub endpoint: String,
    pub parameters: String,
    pub response: Option<String>,
    pub error: Option<String>,
    pub status_code: u16,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub call_log_store: String,
    pub cache_store: String,
}
