#[cfg(test)]
mod tests {
    use crate::database::entity::call_log;
    use crate::database::postgres_repo::PostgresCallLogRepository;
    use surcharge_core::domain::CallLog;
    use surcharge_core::error::RepoError;
    use surcharge_core::ports::CallLogRepository;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr};

    fn model(id: i64, status_code: i32) -> call_log::Model {
        call_log::Model {
            id,
            timestamp: chrono::Utc::now().into(),
            endpoint: "/calculation/".to_owned(),
            parameters: "queryParams={number1=12, number2=50}, pathParams=/calculation/, body="
                .to_owned(),
            response: Some("68.2".to_owned()),
            error: None,
            status_code,
        }
    }

    #[tokio::test]
    async fn test_insert_returns_assigned_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model(7, 200)]])
            .into_connection();

        let repo = PostgresCallLogRepository::new(db);
        let saved = repo
            .insert(CallLog::success("/calculation/", "q", "68.2", 200))
            .await
            .unwrap();

        assert_eq!(saved.id, Some(7));
        assert_eq!(saved.status_code, 200);
        assert_eq!(saved.response.as_deref(), Some("68.2"));
    }

    #[tokio::test]
    async fn test_find_recent_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model(2, 502), model(1, 200)]])
            .into_connection();

        let repo = PostgresCallLogRepository::new(db);
        let logs = repo.find_recent(0, 10).await.unwrap();

        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, Some(2));
        assert_eq!(logs[0].status_code, 502);
    }

    #[tokio::test]
    async fn test_connection_errors_are_classified() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_owned(),
            ))])
            .into_connection();

        let repo = PostgresCallLogRepository::new(db);
        assert!(matches!(
            repo.find_recent(0, 10).await,
            Err(RepoError::Connection(_))
        ));
    }
}
