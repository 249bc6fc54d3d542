use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{validate_optional_text, validate_text};
use super::user::UserSummary;
use crate::entity::{statement, user};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct StatementRequest {
    #[schema(example = "A feira de sábado começa às 7h.")]
    pub message: String,
    #[schema(example = "Informativo")]
    pub stereotype: Option<String>,
}

pub fn validate_statement(payload: &StatementRequest) -> Result<(), AppError> {
    validate_text(&payload.message, "Message", 5000)?;
    validate_optional_text(payload.stereotype.as_deref(), "Stereotype", 50)
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    pub id: Uuid,
    pub message: String,
    pub stereotype: Option<String>,
    /// Author. `null` only if the account row vanished mid-request.
    pub admin: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StatementResponse {
    pub fn new(m: statement::Model, admin: Option<user::Model>) -> Self {
        Self {
            id: m.id,
            message: m.message,
            stereotype: m.stereotype,
            admin: admin.map(UserSummary::from),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
