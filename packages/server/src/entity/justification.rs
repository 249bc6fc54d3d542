use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "justification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub absence_id: Uuid,
    #[sea_orm(belongs_to, from = "absence_id", to = "id", on_delete = "Cascade")]
    pub absence: HasOne<super::absence::Entity>,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[serde(skip)]
    pub annex: Option<Vec<u8>>,
    pub annex_filename: Option<String>,
    pub annex_content_type: Option<String>,

    /// NULL while pending review.
    #[sea_orm(indexed)]
    pub approved: Option<bool>,
    pub approved_by_admin_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub review_reason: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
