use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attraction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub fair_id: Uuid,
    #[sea_orm(belongs_to, from = "fair_id", to = "id")]
    pub fair: HasOne<super::fair::Entity>,

    pub artist_id: Uuid,
    #[sea_orm(belongs_to, from = "artist_id", to = "id")]
    pub artist: HasOne<super::artist::Entity>,

    pub time_start: Time,
    pub time_end: Time,
}

impl ActiveModelBehavior for ActiveModel {}
