use common::UserType;
use serde::{Deserialize, Serialize};

use super::shared::{validate_email, validate_password, validate_text};
use super::user::UserResponse;
use crate::error::AppError;

/// Request body for merchant self-registration.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Maria Souza")]
    pub name: String,
    /// Stored lowercase; must be unique.
    #[schema(example = "maria@vilaagro.com.br")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Merchant category. `ADMIN` is rejected.
    #[serde(rename = "type")]
    pub user_type: UserType,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_text(&payload.name, "Name", 255)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    if !payload.user_type.is_merchant() {
        return Err(AppError::Validation(
            "Only merchant accounts can self-register".into(),
        ));
    }
    Ok(())
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "maria@vilaagro.com.br")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Body returned by register, login and refresh. Tokens travel in cookies only.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    pub success: bool,
    pub user: UserResponse,
}

/// Body returned by logout.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logged out")]
    pub message: String,
    pub success: bool,
}
