use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Announcement broadcast by an admin.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub admin_id: Uuid,
    #[sea_orm(belongs_to, from = "admin_id", to = "id", on_delete = "Cascade")]
    pub admin: HasOne<super::user::Entity>,

    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// Category label, e.g. "Urgente" or "Informativo".
    pub stereotype: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
