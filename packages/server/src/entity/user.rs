use common::{AccountStatus, UserType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    /// Stored lowercase.
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,

    #[sea_orm(indexed)]
    pub status: AccountStatus,
    pub user_type: UserType,

    /// Unique: a sale point has at most one occupant.
    #[sea_orm(unique)]
    pub sale_point_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "sale_point_id", to = "id", on_delete = "SetNull")]
    pub sale_point: BelongsTo<Option<super::sale_point::Entity>>,

    #[sea_orm(has_many)]
    pub absences: HasMany<super::absence::Entity>,

    #[sea_orm(has_many, via = "course_presence")]
    pub courses: HasMany<super::course::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
