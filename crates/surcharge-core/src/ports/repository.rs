use async_trait::async_trait;

use crate::domain::CallLog;
use crate::error::RepoError;

/// Append-only call log store.
#[async_trait]
pub trait CallLogRepository: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    async fn insert(&self, log: CallLog) -> Result<CallLog, RepoError>;

    /// One page of records, most recent first. Pages are zero-based.
    async fn find_recent(&self, page: u64, size: u64) -> Result<Vec<CallLog>, RepoError>;

    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;
}
