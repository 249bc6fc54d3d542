use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artist::ArtistResponse;
use super::fair::FairResponse;
use crate::error::AppError;

/// Create or replace an attraction.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttractionRequest {
    pub fair_id: Uuid,
    pub artist_id: Uuid,
    #[schema(value_type = String, example = "10:00:00")]
    pub time_start: NaiveTime,
    #[schema(value_type = String, example = "11:30:00")]
    pub time_end: NaiveTime,
}

pub fn validate_attraction(payload: &AttractionRequest) -> Result<(), AppError> {
    if payload.time_start >= payload.time_end {
        return Err(AppError::Validation(
            "timeStart must be before timeEnd".into(),
        ));
    }
    Ok(())
}

/// An artist's slot at a fair.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttractionResponse {
    pub id: Uuid,
    #[schema(value_type = String, example = "10:00:00")]
    pub time_start: NaiveTime,
    #[schema(value_type = String, example = "11:30:00")]
    pub time_end: NaiveTime,
    pub fair: FairResponse,
    pub artist: ArtistResponse,
}
