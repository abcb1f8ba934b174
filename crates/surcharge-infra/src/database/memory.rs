//! In-memory call log store - used when no database is configured.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use surcharge_core::domain::CallLog;
use surcharge_core::error::RepoError;
use surcharge_core::ports::CallLogRepository;

/// Append-only log kept in a vector. Lost on restart.
pub struct InMemoryCallLogRepository {
    logs: RwLock<Vec<CallLog>>,
    next_id: AtomicI64,
}

impl InMemoryCallLogRepository {
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryCallLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallLogRepository for InMemoryCallLogRepository {
    async fn insert(&self, mut log: CallLog) -> Result<CallLog, RepoError> {
        log.id = Some(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.logs.write().await.push(log.clone());
        Ok(log)
    }

    async fn find_recent(&self, page: u64, size: u64) -> Result<Vec<CallLog>, RepoError> {
        let mut logs = self.logs.read().await.clone();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let skip = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        let take = usize::try_from(size).unwrap_or(usize::MAX);
        Ok(logs.into_iter().skip(skip).take(take).collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
