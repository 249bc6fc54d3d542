use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use common::{AccountStatus, UserType};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{sale_point, user};
use crate::error::{AppError, ErrorBody};
use crate::models::user::PublicMerchantResponse;
use crate::state::AppState;

fn active_merchants() -> Select<user::Entity> {
    user::Entity::find()
        .filter(user::Column::Status.eq(AccountStatus::Active))
        .filter(user::Column::UserType.ne(UserType::Admin))
}

fn public_profile(user: user::Model, sale_point: Option<&sale_point::Model>) -> PublicMerchantResponse {
    PublicMerchantResponse {
        id: user.id,
        name: user.name,
        user_type: user.user_type,
        sale_point_id: user.sale_point_id,
        sale_point_name: sale_point.map(|sp| sp.name.clone()),
    }
}

#[utoipa::path(
    get,
    path = "/merchants",
    tag = "Public",
    operation_id = "listActiveMerchants",
    summary = "List active merchants",
    description = "Merchants currently holding a sale point, ordered by name.",
    responses(
        (status = 200, description = "Active merchants", body = Vec<PublicMerchantResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_merchants(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicMerchantResponse>>, AppError> {
    let merchants = active_merchants()
        .order_by_asc(user::Column::Name)
        .all(&state.db)
        .await?;

    let point_ids: Vec<Uuid> = merchants.iter().filter_map(|u| u.sale_point_id).collect();
    let points: HashMap<Uuid, sale_point::Model> = sale_point::Entity::find()
        .filter(sale_point::Column::Id.is_in(point_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|sp| (sp.id, sp))
        .collect();

    Ok(Json(
        merchants
            .into_iter()
            .map(|u| {
                let point = u.sale_point_id.and_then(|id| points.get(&id));
                public_profile(u, point)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/merchants/{id}",
    tag = "Public",
    operation_id = "getActiveMerchant",
    summary = "Get an active merchant",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Merchant profile", body = PublicMerchantResponse),
        (status = 404, description = "No active merchant with this ID (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_merchant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicMerchantResponse>, AppError> {
    let (merchant, point) = active_merchants()
        .filter(user::Column::Id.eq(id))
        .find_also_related(sale_point::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Merchant not found".into()))?;

    Ok(Json(public_profile(merchant, point.as_ref())))
}
