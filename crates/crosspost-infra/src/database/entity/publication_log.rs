//! Publication log entity for SeaORM.
//!
//! Deliberately has no foreign key to `posts`: log entries must survive the
//! hard deletion of the post they reference.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use crosspost_core::domain::PublicationLogEntry;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "publication_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub timestamp: DateTimeWithTimeZone,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PublicationLogEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            timestamp: model.timestamp.into(),
            status: model.status,
            message: model.message,
        }
    }
}

impl From<PublicationLogEntry> for ActiveModel {
    fn from(entry: PublicationLogEntry) -> Self {
        Self {
            id: Set(entry.id),
            post_id: Set(entry.post_id),
            timestamp: Set(entry.timestamp.into()),
            status: Set(entry.status),
            message: Set(entry.message),
        }
    }
}
