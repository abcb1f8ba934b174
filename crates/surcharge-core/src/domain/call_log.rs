use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded request/response exchange.
///
/// Records are append-only: the recorder creates them once and nothing in
/// this crate mutates or deletes them afterwards. `id` stays `None` until the
/// store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub parameters: String,
    /// Body of a successful response.
    pub response: Option<String>,
    /// Body of an error response, or the fault message.
    pub error: Option<String>,
    pub status_code: u16,
}

impl CallLog {
    /// A record for a response that completed successfully.
    pub fn success(
        endpoint: impl Into<String>,
        parameters: impl Into<String>,
        body: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::new(endpoint, parameters, Some(body.into()), None, status_code)
    }

    /// A record for an error response or a downstream fault.
    pub fn failure(
        endpoint: impl Into<String>,
        parameters: impl Into<String>,
        error: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::new(endpoint, parameters, None, Some(error.into()), status_code)
    }

    fn new(
        endpoint: impl Into<String>,
        parameters: impl Into<String>,
        response: Option<String>,
        error: Option<String>,
        status_code: u16,
    ) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            endpoint: endpoint.into(),
            parameters: parameters.into(),
            response,
            error,
            status_code,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
