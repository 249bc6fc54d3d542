use common::AbsenceType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One recorded non-attendance. Unique per `(user_id, date)`, see
/// `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "absence")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,

    pub date: Date,
    pub absence_type: AbsenceType,
    /// Mirrors the justification's approval; `false` until approved.
    pub accepted: Option<bool>,

    #[sea_orm(has_one)]
    pub justification: HasOne<super::justification::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
