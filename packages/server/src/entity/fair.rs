use common::FairStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fair")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub date: Date,
    /// Free-form wall-clock time, e.g. "08:00".
    pub start_time: String,
    pub end_time: String,
    #[sea_orm(column_type = "Text")]
    pub notes: Option<String>,
    pub status: FairStatus,

    #[sea_orm(has_many)]
    pub attractions: HasMany<super::attraction::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
