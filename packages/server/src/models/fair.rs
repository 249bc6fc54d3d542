use chrono::{DateTime, NaiveDate, Utc};
use common::FairStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::validate_optional_text;
use crate::entity::fair;
use crate::error::AppError;

/// Create or replace a fair.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FairRequest {
    pub date: NaiveDate,
    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "13:00")]
    pub end_time: String,
    pub notes: Option<String>,
    /// Defaults to `SCHEDULED`.
    pub status: Option<FairStatus>,
}

pub fn validate_fair(payload: &FairRequest) -> Result<(), AppError> {
    for (value, field) in [
        (&payload.start_time, "Start time"),
        (&payload.end_time, "End time"),
    ] {
        let value = value.trim();
        if value.is_empty() || value.chars().count() > 10 {
            return Err(AppError::Validation(format!(
                "{field} must be 1-10 characters"
            )));
        }
    }
    validate_optional_text(payload.notes.as_deref(), "Notes", 2000)
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FairListQuery {
    /// Month (1-12). Must be given together with `year`.
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Resolve the optional month filter into a `[first, next_first)` date range.
pub fn month_range(query: &FairListQuery) -> Result<Option<(NaiveDate, NaiveDate)>, AppError> {
    match (query.month, query.year) {
        (None, None) => Ok(None),
        (Some(month), Some(year)) => {
            if !(1..=12).contains(&month) {
                return Err(AppError::Validation("Month must be 1-12".into()));
            }
            let first = NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| AppError::Validation("Year is out of range".into()))?;
            let (next_year, next_month) = if month == 12 {
                (year + 1, 1)
            } else {
                (year, month + 1)
            };
            let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
                .ok_or_else(|| AppError::Validation("Year is out of range".into()))?;
            Ok(Some((first, next)))
        }
        _ => Err(AppError::Validation(
            "Month and year must be given together".into(),
        )),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FairResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    /// Count of ACTIVE merchants at the time of the request.
    pub expected_merchants: u64,
    pub notes: Option<String>,
    pub status: FairStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FairResponse {
    pub fn new(m: fair::Model, expected_merchants: u64) -> Self {
        Self {
            id: m.id,
            date: m.date,
            start_time: m.start_time,
            end_time: m.end_time,
            expected_merchants,
            notes: m.notes,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
