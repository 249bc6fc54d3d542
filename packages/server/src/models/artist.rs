use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::artist;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistResponse {
    pub id: Uuid,
    #[schema(example = "Trio Forrozeiro")]
    pub name: String,
    #[schema(example = "Forró")]
    pub genre: Option<String>,
    /// Whether `GET /artists/{id}/banner` has an image to serve.
    pub has_banner: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<artist::Model> for ArtistResponse {
    fn from(m: artist::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            genre: m.genre,
            has_banner: m.banner.is_some(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
