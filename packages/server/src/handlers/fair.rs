use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{AccountStatus, UserType};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{attraction, fair, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::attraction::attraction_responses;
use crate::models::attraction::AttractionResponse;
use crate::models::fair::*;
use crate::models::shared::trimmed;
use crate::state::AppState;
use crate::utils::lookup;

/// Merchants expected at any fair: every non-admin account that is currently ACTIVE.
pub(crate) async fn expected_merchants<C: ConnectionTrait>(db: &C) -> Result<u64, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::Status.eq(AccountStatus::Active))
        .filter(user::Column::UserType.ne(UserType::Admin))
        .count(db)
        .await?)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Fairs",
    operation_id = "listFairs",
    summary = "List fairs",
    description = "All fairs ordered by date, optionally restricted to one month via `month` and `year`.",
    params(FairListQuery),
    responses(
        (status = 200, description = "Fairs", body = Vec<FairResponse>),
        (status = 400, description = "Invalid month filter (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_fairs(
    State(state): State<AppState>,
    Query(query): Query<FairListQuery>,
) -> Result<Json<Vec<FairResponse>>, AppError> {
    let mut select = fair::Entity::find();
    if let Some((from, to)) = month_range(&query)? {
        select = select
            .filter(fair::Column::Date.gte(from))
            .filter(fair::Column::Date.lt(to));
    }
    let fairs = select
        .order_by_asc(fair::Column::Date)
        .all(&state.db)
        .await?;

    let expected = expected_merchants(&state.db).await?;
    Ok(Json(
        fairs
            .into_iter()
            .map(|f| FairResponse::new(f, expected))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/next",
    tag = "Fairs",
    operation_id = "getNextFair",
    summary = "Get the next fair",
    description = "The earliest fair dated today (UTC) or later.",
    responses(
        (status = 200, description = "Next fair", body = FairResponse),
        (status = 404, description = "No upcoming fair (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_next_fair(State(state): State<AppState>) -> Result<Json<FairResponse>, AppError> {
    let today = Utc::now().date_naive();
    let next = fair::Entity::find()
        .filter(fair::Column::Date.gte(today))
        .order_by_asc(fair::Column::Date)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No upcoming fair".into()))?;

    let expected = expected_merchants(&state.db).await?;
    Ok(Json(FairResponse::new(next, expected)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Fairs",
    operation_id = "getFair",
    summary = "Get a fair",
    params(("id" = Uuid, Path, description = "Fair ID")),
    responses(
        (status = 200, description = "Fair", body = FairResponse),
        (status = 404, description = "Fair not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_fair(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FairResponse>, AppError> {
    let model = lookup::find_fair(&state.db, id).await?;
    let expected = expected_merchants(&state.db).await?;
    Ok(Json(FairResponse::new(model, expected)))
}

#[utoipa::path(
    get,
    path = "/{id}/attractions",
    tag = "Fairs",
    operation_id = "listFairAttractions",
    summary = "List a fair's attractions",
    description = "Ordered by start time.",
    params(("id" = Uuid, Path, description = "Fair ID")),
    responses(
        (status = 200, description = "Attractions", body = Vec<AttractionResponse>),
        (status = 404, description = "Fair not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn list_fair_attractions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttractionResponse>>, AppError> {
    lookup::find_fair(&state.db, id).await?;
    let attractions = attraction::Entity::find()
        .filter(attraction::Column::FairId.eq(id))
        .order_by_asc(attraction::Column::TimeStart)
        .all(&state.db)
        .await?;
    Ok(Json(attraction_responses(&state.db, attractions).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Fairs",
    operation_id = "createFair",
    summary = "Create a fair",
    request_body = FairRequest,
    responses(
        (status = 201, description = "Fair created", body = FairResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(date = %payload.date))]
pub async fn create_fair(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<FairRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_fair(&payload)?;

    let now = Utc::now();
    let model = fair::ActiveModel {
        id: Set(Uuid::now_v7()),
        date: Set(payload.date),
        start_time: Set(payload.start_time.trim().to_string()),
        end_time: Set(payload.end_time.trim().to_string()),
        notes: Set(trimmed(payload.notes)),
        status: Set(payload.status.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let expected = expected_merchants(&state.db).await?;
    Ok((StatusCode::CREATED, Json(FairResponse::new(model, expected))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Fairs",
    operation_id = "updateFair",
    summary = "Update a fair",
    description = "Replaces date, times and notes. `status` is kept when omitted.",
    params(("id" = Uuid, Path, description = "Fair ID")),
    request_body = FairRequest,
    responses(
        (status = 200, description = "Fair updated", body = FairResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Fair not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_fair(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<FairRequest>,
) -> Result<Json<FairResponse>, AppError> {
    auth_user.require_admin()?;
    validate_fair(&payload)?;

    let existing = lookup::find_fair(&state.db, id).await?;
    let mut active: fair::ActiveModel = existing.into();
    active.date = Set(payload.date);
    active.start_time = Set(payload.start_time.trim().to_string());
    active.end_time = Set(payload.end_time.trim().to_string());
    active.notes = Set(trimmed(payload.notes));
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let expected = expected_merchants(&state.db).await?;
    Ok(Json(FairResponse::new(model, expected)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Fairs",
    operation_id = "deleteFair",
    summary = "Delete a fair",
    description = "A fair that still has attractions cannot be deleted.",
    params(("id" = Uuid, Path, description = "Fair ID")),
    responses(
        (status = 204, description = "Fair deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Fair not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Fair has attractions (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_fair(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let existing = lookup::find_fair(&txn, id).await?;
    let attractions = attraction::Entity::find()
        .filter(attraction::Column::FairId.eq(id))
        .count(&txn)
        .await?;
    if attractions > 0 {
        return Err(AppError::Conflict(format!(
            "Fair still has {attractions} attraction(s); remove them first"
        )));
    }
    existing.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
