use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::validate_text;
use super::user::UserSummary;
use crate::entity::{sale_point, user};
use crate::error::AppError;

/// Create or replace a sale point.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalePointRequest {
    #[schema(example = "Barraca 12")]
    pub name: String,
    pub address_id: Option<Uuid>,
}

pub fn validate_sale_point(payload: &SalePointRequest) -> Result<(), AppError> {
    validate_text(&payload.name, "Name", 255)
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub user_id: Uuid,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalePointResponse {
    pub id: Uuid,
    pub name: String,
    pub address_id: Option<Uuid>,
    /// Current occupant, if any.
    pub allocated_user: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalePointResponse {
    pub fn new(m: sale_point::Model, occupant: Option<user::Model>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            address_id: m.address_id,
            allocated_user: occupant.map(UserSummary::from),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
