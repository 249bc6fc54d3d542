use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{AccountStatus, NotificationType};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{sale_point, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::sale_point::*;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::lookup;
use crate::utils::notify::{self, Notice};

const OCCUPIED: &str = "Sale point is already occupied";

async fn occupant_of<C: ConnectionTrait>(
    db: &C,
    sale_point_id: Uuid,
) -> Result<Option<user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::SalePointId.eq(sale_point_id))
        .one(db)
        .await?)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Sale Points",
    operation_id = "listSalePoints",
    summary = "List sale points",
    description = "All sale points ordered by name, each with its current occupant.",
    responses(
        (status = 200, description = "Sale points", body = Vec<SalePointResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_sale_points(
    State(state): State<AppState>,
) -> Result<Json<Vec<SalePointResponse>>, AppError> {
    let points = sale_point::Entity::find()
        .order_by_asc(sale_point::Column::Name)
        .all(&state.db)
        .await?;

    let mut occupants: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::SalePointId.is_not_null())
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|u| u.sale_point_id.map(|sp| (sp, u)))
        .collect();

    Ok(Json(
        points
            .into_iter()
            .map(|p| {
                let occupant = occupants.remove(&p.id);
                SalePointResponse::new(p, occupant)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Sale Points",
    operation_id = "getSalePoint",
    summary = "Get a sale point",
    params(("id" = Uuid, Path, description = "Sale point ID")),
    responses(
        (status = 200, description = "Sale point", body = SalePointResponse),
        (status = 404, description = "Sale point not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_sale_point(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalePointResponse>, AppError> {
    let point = lookup::find_sale_point(&state.db, id).await?;
    let occupant = occupant_of(&state.db, id).await?;
    Ok(Json(SalePointResponse::new(point, occupant)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Sale Points",
    operation_id = "createSalePoint",
    summary = "Create a sale point",
    request_body = SalePointRequest,
    responses(
        (status = 201, description = "Sale point created", body = SalePointResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Address not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_sale_point(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SalePointRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_sale_point(&payload)?;
    lookup::ensure_address(&state.db, payload.address_id).await?;

    let now = Utc::now();
    let model = sale_point::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(payload.name.trim().to_string()),
        address_id: Set(payload.address_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(SalePointResponse::new(model, None))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Sale Points",
    operation_id = "updateSalePoint",
    summary = "Update a sale point",
    params(("id" = Uuid, Path, description = "Sale point ID")),
    request_body = SalePointRequest,
    responses(
        (status = 200, description = "Sale point updated", body = SalePointResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Sale point or address not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_sale_point(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SalePointRequest>,
) -> Result<Json<SalePointResponse>, AppError> {
    auth_user.require_admin()?;
    validate_sale_point(&payload)?;

    let existing = lookup::find_sale_point(&state.db, id).await?;
    lookup::ensure_address(&state.db, payload.address_id).await?;

    let mut active: sale_point::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.address_id = Set(payload.address_id);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let occupant = occupant_of(&state.db, id).await?;
    Ok(Json(SalePointResponse::new(model, occupant)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Sale Points",
    operation_id = "deleteSalePoint",
    summary = "Delete a sale point",
    description = "Only vacant sale points can be deleted.",
    params(("id" = Uuid, Path, description = "Sale point ID")),
    responses(
        (status = 204, description = "Sale point deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Sale point not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Sale point is occupied (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_sale_point(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let existing = lookup::find_sale_point(&txn, id).await?;
    if occupant_of(&txn, id).await?.is_some() {
        return Err(AppError::Conflict(
            "Sale point is occupied; deallocate it first".into(),
        ));
    }
    existing.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/allocate",
    tag = "Sale Points",
    operation_id = "allocateSalePoint",
    summary = "Allocate a sale point to a merchant",
    description = "Assigns an `APPROVED` merchant to a vacant sale point and moves the account to \
        `ACTIVE`. The merchant receives an `APPROVAL` notification.",
    params(("id" = Uuid, Path, description = "Sale point ID")),
    request_body = AllocateRequest,
    responses(
        (status = 200, description = "Sale point allocated", body = SalePointResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Sale point or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Occupied point, user already allocated, or user not APPROVED (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, user_id = %payload.user_id))]
pub async fn allocate(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AllocateRequest>,
) -> Result<Json<SalePointResponse>, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let point = lookup::find_sale_point(&txn, id).await?;
    let target = lookup::find_user_for_update(&txn, payload.user_id).await?;

    if occupant_of(&txn, id).await?.is_some() {
        return Err(AppError::Conflict(OCCUPIED.into()));
    }
    if target.sale_point_id.is_some() {
        return Err(AppError::Conflict(
            "User already holds a sale point".into(),
        ));
    }
    if target.status != AccountStatus::Approved {
        return Err(AppError::Conflict(format!(
            "Only APPROVED users can be allocated; user is {}",
            target.status
        )));
    }

    let mut active: user::ActiveModel = target.into();
    active.sale_point_id = Set(Some(id));
    active.status = Set(AccountStatus::Active);
    active.updated_at = Set(Utc::now());
    let allocated = active
        .update(&txn)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, OCCUPIED))?;

    notify::push(
        &txn,
        allocated.id,
        &Notice {
            kind: NotificationType::Approval,
            title: "Sale point allocated",
            message: format!(
                "You have been allocated to sale point \"{}\". Your account is now active.",
                point.name
            ),
            action_url: None,
        },
    )
    .await?;

    txn.commit().await?;

    Ok(Json(SalePointResponse::new(point, Some(allocated))))
}

#[utoipa::path(
    delete,
    path = "/{id}/allocate",
    tag = "Sale Points",
    operation_id = "deallocateSalePoint",
    summary = "Release a sale point",
    description = "Removes the occupant and moves their account to `INACTIVE`.",
    params(("id" = Uuid, Path, description = "Sale point ID")),
    responses(
        (status = 200, description = "Former occupant", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Sale point not found or vacant (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn deallocate(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let point = lookup::find_sale_point(&txn, id).await?;
    let occupant = user::Entity::find()
        .filter(user::Column::SalePointId.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale point has no occupant".into()))?;

    let mut active: user::ActiveModel = occupant.into();
    active.sale_point_id = Set(None);
    active.status = Set(AccountStatus::Inactive);
    active.updated_at = Set(Utc::now());
    let released = active.update(&txn).await?;

    notify::push(
        &txn,
        released.id,
        &Notice {
            kind: NotificationType::Approval,
            title: "Sale point released",
            message: format!(
                "You are no longer allocated to sale point \"{}\".",
                point.name
            ),
            action_url: None,
        },
    )
    .await?;

    txn.commit().await?;

    Ok(Json(released.into()))
}
