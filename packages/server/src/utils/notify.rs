use common::{NotificationType, UserType};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::{notification, user};
use crate::error::AppError;

/// Content of a notification to deliver.
pub struct Notice<'a> {
    pub kind: NotificationType,
    pub title: &'a str,
    pub message: String,
    pub action_url: Option<&'a str>,
}

/// Store a notification for one user.
pub async fn push<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    notice: &Notice<'_>,
) -> Result<(), AppError> {
    notification::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(user_id),
        title: Set(notice.title.to_string()),
        message: Set(notice.message.clone()),
        notification_type: Set(notice.kind),
        is_read: Set(false),
        action_url: Set(notice.action_url.map(str::to_string)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Store a copy of the notification for every admin account.
pub async fn push_to_admins<C: ConnectionTrait>(
    db: &C,
    notice: &Notice<'_>,
) -> Result<usize, AppError> {
    let admin_ids: Vec<Uuid> = user::Entity::find()
        .filter(user::Column::UserType.eq(UserType::Admin))
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();

    for id in &admin_ids {
        push(db, *id, notice).await?;
    }
    Ok(admin_ids.len())
}
