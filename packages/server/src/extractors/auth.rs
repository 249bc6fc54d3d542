use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use common::UserType;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookies::ACCESS_COOKIE;
use crate::utils::jwt::{self, TokenType};

/// Authenticated caller, resolved from the `accessToken` cookie.
///
/// An `Authorization: Bearer <token>` header is accepted when the cookie is absent,
/// for non-browser clients. Only ACCESS tokens authenticate; a refresh token is
/// rejected as invalid.
///
/// Add this as a handler parameter to require authentication.
/// Role checks happen via `require_admin()` in the handler body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub user_type: UserType,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.user_type.is_admin()
    }

    /// Returns `Ok(())` for admins, `Err(PermissionDenied)` otherwise.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Admins may act on anything; everyone else only on their own records.
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = match jar.get(ACCESS_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => bearer_token(parts)
                .ok_or(AppError::TokenMissing)?
                .to_string(),
        };

        let claims = jwt::verify(&token, &state.config.auth.jwt_secret, TokenType::Access)
            .map_err(|e| {
                tracing::debug!("Rejected access token: {e}");
                AppError::TokenInvalid
            })?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
            user_type: claims.user_type,
        })
    }
}
