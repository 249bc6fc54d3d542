use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{AccountStatus, NotificationType};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{document, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{normalize_email, trimmed, validate_password};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::notify::{self, Notice};
use crate::utils::{hash, lookup};

fn email_taken(err: DbErr) -> AppError {
    if crate::error::is_unique_violation(&err) {
        AppError::EmailTaken
    } else {
        AppError::from(err)
    }
}

/// 409 `EMAIL_TAKEN` if another account already uses `email`.
async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut select = user::Entity::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except {
        select = select.filter(user::Column::Id.ne(id));
    }
    if select.one(db).await?.is_some() {
        return Err(AppError::EmailTaken);
    }
    Ok(())
}

fn hash_or_internal(password: &str) -> Result<String, AppError> {
    hash::hash_password(password).map_err(|e| AppError::Internal(format!("Password hash error: {e}")))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List all accounts",
    responses(
        (status = 200, description = "Users, newest first", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth_user.require_admin()?;
    let users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/pending",
    tag = "Users",
    operation_id = "listPendingUsers",
    summary = "List accounts awaiting review",
    description = "Accounts in `PENDING`, oldest first.",
    responses(
        (status = 200, description = "Pending users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_pending_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth_user.require_admin()?;
    let users = user::Entity::find()
        .filter(user::Column::Status.eq(AccountStatus::Pending))
        .order_by_asc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get an account",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_admin()?;
    Ok(Json(lookup::find_user(&state.db, id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create an account",
    description = "Admins may create accounts of any type, including other admins.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(email = %payload.email))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_user(&payload)?;

    let email = normalize_email(&payload.email);
    ensure_email_free(&state.db, &email, None).await?;

    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password: Set(hash_or_internal(&payload.password)?),
        status: Set(payload.status.unwrap_or_default()),
        user_type: Set(payload.user_type),
        sale_point_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(email_taken)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update an account",
    description = "Only the fields sent are changed. Status changes go through `PUT /users/{id}/status`.",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_user(&payload)?;

    let existing = lookup::find_user(&state.db, id).await?;
    let mut active: user::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        let email = normalize_email(&email);
        ensure_email_free(&state.db, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(user_type) = payload.user_type {
        active.user_type = Set(user_type);
    }
    if let Some(password) = payload.password {
        active.password = Set(hash_or_internal(&password)?);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await.map_err(email_taken)?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "Users",
    operation_id = "updateUserStatus",
    summary = "Change an account's status",
    description = "`ACTIVE` cannot be set here; it follows from sale point allocation. Leaving \
        `ACTIVE` releases the user's sale point. The user receives an `APPROVAL` notification \
        that includes the optional `reason`.",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, status = %payload.status))]
pub async fn update_user_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<StatusUpdateRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_admin()?;
    validate_status_update(&payload)?;

    let txn = state.db.begin().await?;
    let target = lookup::find_user_for_update(&txn, id).await?;
    let had_sale_point = target.sale_point_id.is_some();

    let mut active: user::ActiveModel = target.into();
    active.status = Set(payload.status);
    if had_sale_point {
        active.sale_point_id = Set(None);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;

    let mut message = format!("Your account status is now {}.", payload.status);
    if let Some(reason) = trimmed(payload.reason) {
        message.push_str(&format!(" Reason: {reason}"));
    }
    notify::push(
        &txn,
        model.id,
        &Notice {
            kind: NotificationType::Approval,
            title: "Account status updated",
            message,
            action_url: None,
        },
    )
    .await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete an account",
    description = "Removes the account with its absences, enrollments, documents and notifications. \
        Admins cannot delete themselves.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Attempt to delete own account (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;
    if id == auth_user.user_id {
        return Err(AppError::Conflict("You cannot delete your own account".into()));
    }

    let target = lookup::find_user(&state.db, id).await?;
    let keys: Vec<String> = document::Entity::find()
        .filter(document::Column::UserId.eq(id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|d| d.storage_key)
        .collect();

    target.delete(&state.db).await?;

    for key in keys {
        if let Err(e) = state.file_store.delete(&key).await {
            tracing::warn!(%key, "Failed to remove document of deleted user: {e}");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    operation_id = "getProfile",
    summary = "Get the caller's profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(lookup::find_user(&state.db, auth_user.user_id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/me",
    tag = "Users",
    operation_id = "updateProfile",
    summary = "Update the caller's name or email",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProfileUpdateRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_profile_update(&payload)?;

    let existing = lookup::find_user(&state.db, auth_user.user_id).await?;
    let mut active: user::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        let email = normalize_email(&email);
        ensure_email_free(&state.db, &email, Some(auth_user.user_id)).await?;
        active.email = Set(email);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await.map_err(email_taken)?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/me/password",
    tag = "Users",
    operation_id = "changePassword",
    summary = "Change the caller's password",
    request_body = PasswordUpdateRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new one (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<PasswordUpdateRequest>,
) -> Result<StatusCode, AppError> {
    validate_password(&payload.new_password)?;

    let existing = lookup::find_user(&state.db, auth_user.user_id).await?;
    let matches = hash::verify_password(&payload.current_password, &existing.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
    if !matches {
        return Err(AppError::Validation("Current password is incorrect".into()));
    }

    let mut active: user::ActiveModel = existing.into();
    active.password = Set(hash_or_internal(&payload.new_password)?);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/me/termination",
    tag = "Users",
    operation_id = "requestTermination",
    summary = "Leave the program",
    description = "Moves the caller to `INACTIVE`, releases their sale point and notifies every admin.",
    request_body = TerminationRequest,
    responses(
        (status = 200, description = "Account deactivated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Admins cannot terminate (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn request_termination(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TerminationRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if auth_user.is_admin() {
        return Err(AppError::PermissionDenied);
    }
    validate_termination(&payload)?;

    let txn = state.db.begin().await?;
    let me = lookup::find_user_for_update(&txn, auth_user.user_id).await?;
    let mut active: user::ActiveModel = me.into();
    active.status = Set(AccountStatus::Inactive);
    active.sale_point_id = Set(None);
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;

    let mut message = format!(
        "{} ({}) requested termination. Reason: {}",
        model.name,
        model.email,
        payload.reason.trim()
    );
    if let Some(details) = trimmed(payload.details) {
        message.push_str(&format!(". Details: {details}"));
    }
    let notified = notify::push_to_admins(
        &txn,
        &Notice {
            kind: NotificationType::System,
            title: "Termination request",
            message,
            action_url: None,
        },
    )
    .await?;
    txn.commit().await?;

    tracing::info!(notified, "Merchant terminated participation");
    Ok(Json(model.into()))
}
