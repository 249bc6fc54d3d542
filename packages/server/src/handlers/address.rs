use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::address;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::address::*;
use crate::models::shared::trimmed;
use crate::state::AppState;
use crate::utils::lookup;

#[utoipa::path(
    get,
    path = "/",
    tag = "Addresses",
    operation_id = "listAddresses",
    summary = "List addresses",
    description = "Ordered by city, then street.",
    responses(
        (status = 200, description = "Addresses", body = Vec<AddressResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_addresses(
    State(state): State<AppState>,
) -> Result<Json<Vec<AddressResponse>>, AppError> {
    let addresses = address::Entity::find()
        .order_by_asc(address::Column::City)
        .order_by_asc(address::Column::Street)
        .all(&state.db)
        .await?;
    Ok(Json(addresses.into_iter().map(AddressResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Addresses",
    operation_id = "getAddress",
    summary = "Get an address",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address", body = AddressResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Address not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_address(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AddressResponse>, AppError> {
    auth_user.require_admin()?;
    Ok(Json(lookup::find_address(&state.db, id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Addresses",
    operation_id = "createAddress",
    summary = "Create an address",
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Address created", body = AddressResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_address(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AddressRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_address(&payload)?;

    let now = Utc::now();
    let model = address::ActiveModel {
        id: Set(Uuid::now_v7()),
        street: Set(payload.street.trim().to_string()),
        neighborhood: Set(payload.neighborhood.trim().to_string()),
        number: Set(trimmed(payload.number)),
        reference: Set(trimmed(payload.reference)),
        cep: Set(trimmed(payload.cep)),
        city: Set(payload.city.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(AddressResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Addresses",
    operation_id = "updateAddress",
    summary = "Replace an address",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address updated", body = AddressResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Address not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_address(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AddressRequest>,
) -> Result<Json<AddressResponse>, AppError> {
    auth_user.require_admin()?;
    validate_address(&payload)?;

    let existing = lookup::find_address(&state.db, id).await?;
    let mut active: address::ActiveModel = existing.into();
    active.street = Set(payload.street.trim().to_string());
    active.neighborhood = Set(payload.neighborhood.trim().to_string());
    active.number = Set(trimmed(payload.number));
    active.reference = Set(trimmed(payload.reference));
    active.cep = Set(trimmed(payload.cep));
    active.city = Set(payload.city.trim().to_string());
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Addresses",
    operation_id = "deleteAddress",
    summary = "Delete an address",
    description = "Sale points and courses pointing at it lose their address.",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Address not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_address(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;
    let existing = lookup::find_address(&state.db, id).await?;
    existing.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
