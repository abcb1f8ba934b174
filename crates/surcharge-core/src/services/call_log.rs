use std::sync::Arc;

use crate::domain::CallLog;
use crate::error::RepoError;
use crate::ports::CallLogRepository;

/// Writes and reads call records.
pub struct CallLogService {
    repo: Arc<dyn CallLogRepository>,
}

impl CallLogService {
    pub fn new(repo: Arc<dyn CallLogRepository>) -> Self {
        Self { repo }
    }

    /// Best-effort persistence: a store failure is logged and dropped so it
    /// can never reach the client that produced the record.
    pub async fn record(&self, log: CallLog) {
        let endpoint = log.endpoint.clone();
        let status_code = log.status_code;

        match self.repo.insert(log).await {
            Ok(saved) => {
                tracing::debug!(id = ?saved.id, %endpoint, status_code, "Call recorded");
            }
            Err(e) => {
                tracing::warn!(%endpoint, status_code, error = %e, "Failed to persist call log");
            }
        }
    }

    /// One page of records, most recent first.
    pub async fn recent(&self, page: u64, size: u64) -> Result<Vec<CallLog>, RepoError> {
        self.repo.find_recent(page, size).await
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }
}
