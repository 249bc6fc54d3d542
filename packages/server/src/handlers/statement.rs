use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{statement, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::trimmed;
use crate::models::statement::*;
use crate::state::AppState;
use crate::utils::lookup;

#[utoipa::path(
    get,
    path = "/",
    tag = "Statements",
    operation_id = "listStatements",
    summary = "List statements",
    description = "Newest first, each with its author.",
    responses(
        (status = 200, description = "Statements", body = Vec<StatementResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_statements(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<StatementResponse>>, AppError> {
    let statements = statement::Entity::find()
        .order_by_desc(statement::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let admin_ids: Vec<Uuid> = statements.iter().map(|s| s.admin_id).collect();
    let admins: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(admin_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(Json(
        statements
            .into_iter()
            .map(|s| {
                let admin = admins.get(&s.admin_id).cloned();
                StatementResponse::new(s, admin)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Statements",
    operation_id = "getStatement",
    summary = "Get a statement",
    params(("id" = Uuid, Path, description = "Statement ID")),
    responses(
        (status = 200, description = "Statement", body = StatementResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Statement not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id = %id))]
pub async fn get_statement(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatementResponse>, AppError> {
    let model = lookup::find_statement(&state.db, id).await?;
    let admin = user::Entity::find_by_id(model.admin_id).one(&state.db).await?;
    Ok(Json(StatementResponse::new(model, admin)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Statements",
    operation_id = "createStatement",
    summary = "Publish a statement",
    description = "The calling admin is recorded as the author.",
    request_body = StatementRequest,
    responses(
        (status = 201, description = "Statement created", body = StatementResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(admin_id = %auth_user.user_id))]
pub async fn create_statement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<StatementRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_statement(&payload)?;
    let admin = lookup::find_user(&state.db, auth_user.user_id).await?;

    let now = Utc::now();
    let model = statement::ActiveModel {
        id: Set(Uuid::now_v7()),
        admin_id: Set(admin.id),
        message: Set(payload.message.trim().to_string()),
        stereotype: Set(trimmed(payload.stereotype)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(StatementResponse::new(model, Some(admin))),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Statements",
    operation_id = "updateStatement",
    summary = "Edit a statement",
    params(("id" = Uuid, Path, description = "Statement ID")),
    request_body = StatementRequest,
    responses(
        (status = 200, description = "Statement updated", body = StatementResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Statement not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_statement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<StatementRequest>,
) -> Result<Json<StatementResponse>, AppError> {
    auth_user.require_admin()?;
    validate_statement(&payload)?;

    let existing = lookup::find_statement(&state.db, id).await?;
    let mut active: statement::ActiveModel = existing.into();
    active.message = Set(payload.message.trim().to_string());
    active.stereotype = Set(trimmed(payload.stereotype));
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let admin = user::Entity::find_by_id(model.admin_id).one(&state.db).await?;
    Ok(Json(StatementResponse::new(model, admin)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Statements",
    operation_id = "deleteStatement",
    summary = "Delete a statement",
    params(("id" = Uuid, Path, description = "Statement ID")),
    responses(
        (status = 204, description = "Statement deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Statement not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_statement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;
    let existing = lookup::find_statement(&state.db, id).await?;
    existing.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
