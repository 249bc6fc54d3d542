use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use common::AccountStatus;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, validate_login_request,
    validate_register_request,
};
use crate::models::shared::normalize_email;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::cookies::{ACCESS_COOKIE, REFRESH_COOKIE, auth_cookie, expired_cookie};
use crate::utils::jwt::{self, TokenType};
use crate::utils::{hash, lookup};

/// Mint an access/refresh pair for `user` and attach both cookies to `jar`.
fn issue_session(
    jar: CookieJar,
    user: &user::Model,
    config: &AuthConfig,
) -> Result<CookieJar, AppError> {
    let mint = |token_type, ttl| {
        jwt::sign(
            user.id,
            &user.email,
            user.user_type,
            token_type,
            ttl,
            &config.jwt_secret,
        )
        .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))
    };
    let access = mint(TokenType::Access, config.access_token_ttl_secs)?;
    let refresh = mint(TokenType::Refresh, config.refresh_token_ttl_secs)?;

    Ok(jar
        .add(auth_cookie(
            ACCESS_COOKIE,
            access,
            config.access_token_ttl_secs,
            config.cookie_secure,
        ))
        .add(auth_cookie(
            REFRESH_COOKIE,
            refresh,
            config.refresh_token_ttl_secs,
            config.cookie_secure,
        )))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a merchant account",
    description = "Creates a `PENDING` merchant account and signs it in by setting the \
        `accessToken` and `refreshToken` cookies. `ADMIN` accounts cannot self-register.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let email = normalize_email(&payload.email);
    let taken = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();
    if taken {
        return Err(AppError::EmailTaken);
    }

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password: Set(hash),
        status: Set(AccountStatus::Pending),
        user_type: Set(payload.user_type),
        sale_point_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::EmailTaken
        }
        _ => AppError::from(e),
    })?;

    let jar = issue_session(jar, &user, &state.config.auth)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "Registration successful".into(),
            success: true,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Sign in",
    description = "Verifies the credentials and sets the `accessToken` and `refreshToken` cookies.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(&payload.email)))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let jar = issue_session(jar, &user, &state.config.auth)?;
    Ok((
        jar,
        Json(AuthResponse {
            message: "Login successful".into(),
            success: true,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Sign out",
    description = "Expires both auth cookies. Succeeds whether or not the caller was signed in.",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
    ),
)]
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let secure = state.config.auth.cookie_secure;
    let jar = jar
        .add(expired_cookie(ACCESS_COOKIE, secure))
        .add(expired_cookie(REFRESH_COOKIE, secure));
    (
        jar,
        Json(MessageResponse {
            message: "Logged out".into(),
            success: true,
        }),
    )
}

#[utoipa::path(
    post,
    path = "/refresh",
    tag = "Auth",
    operation_id = "refreshSession",
    summary = "Rotate the session cookies",
    description = "Exchanges a valid `refreshToken` cookie for a fresh cookie pair. The user is \
        re-read so the new claims reflect the current account type.",
    responses(
        (status = 200, description = "Session refreshed", body = AuthResponse),
        (status = 401, description = "Missing or invalid refresh token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::TokenMissing)?;

    let claims = jwt::verify(&token, &state.config.auth.jwt_secret, TokenType::Refresh)
        .map_err(|e| {
            tracing::debug!("Rejected refresh token: {e}");
            AppError::TokenInvalid
        })?;

    let user = user::Entity::find_by_id(claims.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let jar = issue_session(jar, &user, &state.config.auth)?;
    Ok((
        jar,
        Json(AuthResponse {
            message: "Session refreshed".into(),
            success: true,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get the signed-in account",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = lookup::find_user(&state.db, auth_user.user_id).await?;
    Ok(Json(user.into()))
}
