use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub datetime: DateTimeUtc,

    pub address_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "address_id", to = "id", on_delete = "SetNull")]
    pub address: BelongsTo<Option<super::address::Entity>>,

    #[sea_orm(has_many, via = "course_presence")]
    pub users: HasMany<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
