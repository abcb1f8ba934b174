//! PostgreSQL call log repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryOrder};

use surcharge_core::domain::CallLog;
use surcharge_core::error::RepoError;
use surcharge_core::ports::CallLogRepository;

use super::entity::call_log::{self, Entity as CallLogEntity};

pub struct PostgresCallLogRepository {
    db: DbConn,
}

impl PostgresCallLogRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn repo_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl CallLogRepository for PostgresCallLogRepository {
    async fn insert(&self, log: CallLog) -> Result<CallLog, RepoError> {
        let active: call_log::ActiveModel = log.into();
        let model = active.insert(&self.db).await.map_err(repo_error)?;
        Ok(model.into())
    }

    async fn find_recent(&self, page: u64, size: u64) -> Result<Vec<CallLog>, RepoError> {
        if size == 0 {
            return Ok(Vec::new());
        }

        tracing::debug!(page, size, "Loading call logs");

        let models = CallLogEntity::find()
            .order_by_desc(call_log::Column::Timestamp)
            .order_by_desc(call_log::Column::Id)
            .paginate(&self.db, size)
            .fetch_page(page)
            .await
            .map_err(repo_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
