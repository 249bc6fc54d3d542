use axum::Json;
use axum::extract::State;
use common::{AccountStatus, UserType};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{justification, sale_point, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::{DashboardStatsResponse, occupation_rate};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Dashboard",
    operation_id = "getDashboardStats",
    summary = "Admin overview counters",
    responses(
        (status = 200, description = "Counters", body = DashboardStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    auth_user.require_admin()?;

    let pending_registrations = user::Entity::find()
        .filter(user::Column::Status.eq(AccountStatus::Pending))
        .filter(user::Column::UserType.ne(UserType::Admin))
        .count(&state.db)
        .await?;
    let waiting_list = user::Entity::find()
        .filter(user::Column::Status.eq(AccountStatus::Approved))
        .filter(user::Column::UserType.ne(UserType::Admin))
        .filter(user::Column::SalePointId.is_null())
        .count(&state.db)
        .await?;
    let pending_justifications = justification::Entity::find()
        .filter(justification::Column::Approved.is_null())
        .count(&state.db)
        .await?;
    let total_sale_points = sale_point::Entity::find().count(&state.db).await?;
    let occupied_sale_points = user::Entity::find()
        .filter(user::Column::SalePointId.is_not_null())
        .count(&state.db)
        .await?;

    Ok(Json(DashboardStatsResponse {
        pending_registrations,
        waiting_list,
        pending_justifications,
        total_sale_points,
        occupied_sale_points,
        occupation_rate: occupation_rate(occupied_sale_points, total_sale_points),
    }))
}
