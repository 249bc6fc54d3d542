use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "address")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub street: String,
    pub neighborhood: String,
    pub number: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub reference: Option<String>,
    /// Brazilian postal code, `00000-000`.
    pub cep: Option<String>,
    pub city: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
