use chrono::{DateTime, Utc};
use common::{AccountStatus, UserType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{validate_email, validate_optional_text, validate_password, validate_text};
use crate::entity::user;
use crate::error::AppError;

/// Full account view. Never includes the password hash.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub sale_point_id: Option<Uuid>,
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "maria@vilaagro.com.br")]
    pub email: String,
    pub status: AccountStatus,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            sale_point_id: m.sale_point_id,
            name: m.name,
            email: m.email,
            status: m.status,
            user_type: m.user_type,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Compact user reference embedded in other resources.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

impl From<user::Model> for UserSummary {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            user_type: m.user_type,
        }
    }
}

/// Public merchant profile; no email, no status.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicMerchantResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub sale_point_id: Option<Uuid>,
    pub sale_point_name: Option<String>,
}

/// Admin-side account creation.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Defaults to `PENDING`. `ACTIVE` is only reachable through allocation.
    pub status: Option<AccountStatus>,
}

pub fn validate_create_user(payload: &CreateUserRequest) -> Result<(), AppError> {
    validate_text(&payload.name, "Name", 255)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    if payload.status == Some(AccountStatus::Active) {
        return Err(AppError::Validation(
            "Status ACTIVE is set by sale point allocation".into(),
        ));
    }
    Ok(())
}

/// Admin-side partial update. Absent fields are left unchanged.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub user_type: Option<UserType>,
    pub password: Option<String>,
}

pub fn validate_update_user(payload: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_text(name, "Name", 255)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }
    Ok(())
}

/// Self-service profile update.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub fn validate_profile_update(payload: &ProfileUpdateRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_text(name, "Name", 255)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Admin decision on an account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StatusUpdateRequest {
    pub status: AccountStatus,
    /// Included in the notification sent to the user.
    pub reason: Option<String>,
}

pub fn validate_status_update(payload: &StatusUpdateRequest) -> Result<(), AppError> {
    if payload.status == AccountStatus::Active {
        return Err(AppError::Validation(
            "Status ACTIVE is set by sale point allocation".into(),
        ));
    }
    validate_optional_text(payload.reason.as_deref(), "Reason", 1000)
}

/// A merchant asking to leave the program.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TerminationRequest {
    pub reason: String,
    pub details: Option<String>,
}

pub fn validate_termination(payload: &TerminationRequest) -> Result<(), AppError> {
    validate_text(&payload.reason, "Reason", 255)?;
    validate_optional_text(payload.details.as_deref(), "Details", 2000)
}
