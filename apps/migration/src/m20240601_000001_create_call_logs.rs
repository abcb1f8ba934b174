use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CallLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CallLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CallLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CallLogs::Endpoint).string().not_null())
                    .col(ColumnDef::new(CallLogs::Parameters).text().not_null())
                    .col(ColumnDef::new(CallLogs::Response).text().null())
                    .col(ColumnDef::new(CallLogs::Error).text().null())
                    .col(ColumnDef::new(CallLogs::StatusCode).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Listing is always newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_call_logs_timestamp")
                    .table(CallLogs::Table)
                    .col(CallLogs::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CallLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CallLogs {
    Table,
    Id,
    Timestamp,
    Endpoint,
    Parameters,
    Response,
    Error,
    StatusCode,
}
