use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{artist, attraction, fair};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::fair::expected_merchants;
use crate::models::artist::ArtistResponse;
use crate::models::attraction::*;
use crate::models::fair::FairResponse;
use crate::state::AppState;
use crate::utils::lookup;

/// Embed each attraction's fair and artist, keeping the input order.
pub(crate) async fn attraction_responses<C: ConnectionTrait>(
    db: &C,
    attractions: Vec<attraction::Model>,
) -> Result<Vec<AttractionResponse>, AppError> {
    if attractions.is_empty() {
        return Ok(Vec::new());
    }

    let fair_ids: Vec<Uuid> = attractions.iter().map(|a| a.fair_id).collect();
    let artist_ids: Vec<Uuid> = attractions.iter().map(|a| a.artist_id).collect();

    let fairs: HashMap<Uuid, fair::Model> = fair::Entity::find()
        .filter(fair::Column::Id.is_in(fair_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();
    let artists: HashMap<Uuid, artist::Model> = artist::Entity::find()
        .filter(artist::Column::Id.is_in(artist_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let expected = expected_merchants(db).await?;

    attractions
        .into_iter()
        .map(|a| {
            let fair = fairs
                .get(&a.fair_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("fair {} missing for attraction", a.fair_id)))?;
            let artist = artists
                .get(&a.artist_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("artist {} missing for attraction", a.artist_id)))?;
            Ok(AttractionResponse {
                id: a.id,
                time_start: a.time_start,
                time_end: a.time_end,
                fair: FairResponse::new(fair, expected),
                artist: ArtistResponse::from(artist),
            })
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Attractions",
    operation_id = "listAttractions",
    summary = "List attractions",
    description = "All attractions ordered by fair date, then start time.",
    responses(
        (status = 200, description = "Attractions", body = Vec<AttractionResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_attractions(
    State(state): State<AppState>,
) -> Result<Json<Vec<AttractionResponse>>, AppError> {
    let attractions = attraction::Entity::find()
        .inner_join(fair::Entity)
        .order_by_asc(fair::Column::Date)
        .order_by_asc(attraction::Column::TimeStart)
        .all(&state.db)
        .await?;
    Ok(Json(attraction_responses(&state.db, attractions).await?))
}

#[utoipa::path(
    get,
    path = "/upcoming",
    tag = "Attractions",
    operation_id = "listUpcomingAttractions",
    summary = "List upcoming attractions",
    description = "Attractions of fairs dated today (UTC) or later, ordered by fair date, then start time.",
    responses(
        (status = 200, description = "Attractions", body = Vec<AttractionResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_upcoming_attractions(
    State(state): State<AppState>,
) -> Result<Json<Vec<AttractionResponse>>, AppError> {
    let today = Utc::now().date_naive();
    let attractions = attraction::Entity::find()
        .inner_join(fair::Entity)
        .filter(fair::Column::Date.gte(today))
        .order_by_asc(fair::Column::Date)
        .order_by_asc(attraction::Column::TimeStart)
        .all(&state.db)
        .await?;
    Ok(Json(attraction_responses(&state.db, attractions).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Attractions",
    operation_id = "createAttraction",
    summary = "Schedule an artist at a fair",
    request_body = AttractionRequest,
    responses(
        (status = 201, description = "Attraction created", body = AttractionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Fair or artist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(fair_id = %payload.fair_id, artist_id = %payload.artist_id))]
pub async fn create_attraction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AttractionRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    lookup::find_fair(&state.db, payload.fair_id).await?;
    lookup::find_artist(&state.db, payload.artist_id).await?;
    validate_attraction(&payload)?;

    let model = attraction::ActiveModel {
        id: Set(Uuid::now_v7()),
        fair_id: Set(payload.fair_id),
        artist_id: Set(payload.artist_id),
        time_start: Set(payload.time_start),
        time_end: Set(payload.time_end),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let mut responses = attraction_responses(&state.db, vec![model]).await?;
    let created = responses
        .pop()
        .ok_or_else(|| AppError::Internal("attraction missing after insert".into()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Attractions",
    operation_id = "updateAttraction",
    summary = "Update an attraction",
    params(("id" = Uuid, Path, description = "Attraction ID")),
    request_body = AttractionRequest,
    responses(
        (status = 200, description = "Attraction updated", body = AttractionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Attraction, fair or artist not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_attraction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AttractionRequest>,
) -> Result<Json<AttractionResponse>, AppError> {
    auth_user.require_admin()?;
    let existing = lookup::find_attraction(&state.db, id).await?;
    lookup::find_fair(&state.db, payload.fair_id).await?;
    lookup::find_artist(&state.db, payload.artist_id).await?;
    validate_attraction(&payload)?;

    let mut active: attraction::ActiveModel = existing.into();
    active.fair_id = Set(payload.fair_id);
    active.artist_id = Set(payload.artist_id);
    active.time_start = Set(payload.time_start);
    active.time_end = Set(payload.time_end);
    let model = active.update(&state.db).await?;

    let mut responses = attraction_responses(&state.db, vec![model]).await?;
    let updated = responses
        .pop()
        .ok_or_else(|| AppError::Internal("attraction missing after update".into()))?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Attractions",
    operation_id = "deleteAttraction",
    summary = "Delete an attraction",
    params(("id" = Uuid, Path, description = "Attraction ID")),
    responses(
        (status = 204, description = "Attraction deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Attraction not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_attraction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;
    let existing = lookup::find_attraction(&state.db, id).await?;
    existing.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
