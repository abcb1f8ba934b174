//! Call log entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "call_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: DateTimeWithTimeZone,
    pub endpoint: String,
    #[sea_orm(column_type = "Text")]
    pub parameters: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub response: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,
    pub status_code: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain CallLog.
impl From<Model> for surcharge_core::domain::CallLog {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            timestamp: model.timestamp.into(),
            endpoint: model.endpoint,
            parameters: model.parameters,
            response: model.response,
            error: model.error,
            status_code: u16::try_from(model.status_code).unwrap_or_default(),
        }
    }
}

/// Conversion from Domain CallLog to SeaORM ActiveModel. The id is left to
/// the database unless the record already carries one.
impl From<surcharge_core::domain::CallLog> for ActiveModel {
    fn from(log: surcharge_core::domain::CallLog) -> Self {
        Self {
            id: match log.id {
                Some(id) => Set(id),
                None => NotSet,
            },
            timestamp: Set(log.timestamp.into()),
            endpoint: Set(log.endpoint),
            parameters: Set(log.parameters),
            response: Set(log.response),
            error: Set(log.error),
            status_code: Set(i32::from(log.status_code)),
        }
    }
}
