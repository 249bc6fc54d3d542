use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::validate_text;
use crate::entity::{course, course_presence};
use crate::error::AppError;

/// Create or replace a course.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    #[schema(example = "Boas práticas de manipulação de alimentos")]
    pub title: String,
    pub description: String,
    pub datetime: DateTime<Utc>,
    pub address_id: Option<Uuid>,
}

pub fn validate_course(payload: &CourseRequest) -> Result<(), AppError> {
    validate_text(&payload.title, "Title", 255)?;
    validate_text(&payload.description, "Description", 5000)
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseSearchQuery {
    /// Case-insensitive substring of the title.
    pub title: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub datetime: DateTime<Utc>,
    pub address_id: Option<Uuid>,
    pub enrolled_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseResponse {
    pub fn new(m: course::Model, enrolled_count: u64) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            datetime: m.datetime,
            address_id: m.address_id,
            enrolled_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<course_presence::Model> for EnrollmentResponse {
    fn from(m: course_presence::Model) -> Self {
        Self {
            user_id: m.user_id,
            course_id: m.course_id,
            created_at: m.created_at,
        }
    }
}
