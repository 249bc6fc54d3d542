use chrono::Utc;
use common::{AccountStatus, UserType};
use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::config::BootstrapConfig;
use crate::entity::{absence, fair, notification, user};
use crate::models::shared::normalize_email;
use crate::utils::hash;

async fn create_index(
    db: &DatabaseConnection,
    name: &str,
    stmt: &IndexCreateStatement,
) -> Result<(), DbErr> {
    db.execute_unprepared(&stmt.to_string(PostgresQueryBuilder))
        .await?;
    info!("Ensured index {name} exists");
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes, so we create them
/// manually on startup. `uq_absence_user_date` backs duplicate detection for
/// absences and must exist; the other two only speed up queries.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_index(
        db,
        "uq_absence_user_date",
        Index::create()
            .if_not_exists()
            .unique()
            .name("uq_absence_user_date")
            .table(absence::Entity)
            .col(absence::Column::UserId)
            .col(absence::Column::Date),
    )
    .await?;

    // SELECT ... FROM notification WHERE user_id = ? AND is_read = false
    if let Err(e) = create_index(
        db,
        "idx_notification_user_read",
        Index::create()
            .if_not_exists()
            .name("idx_notification_user_read")
            .table(notification::Entity)
            .col(notification::Column::UserId)
            .col(notification::Column::IsRead),
    )
    .await
    {
        tracing::warn!("Failed to create index idx_notification_user_read: {e}");
    }

    if let Err(e) = create_index(
        db,
        "idx_fair_date",
        Index::create()
            .if_not_exists()
            .name("idx_fair_date")
            .table(fair::Entity)
            .col(fair::Column::Date),
    )
    .await
    {
        tracing::warn!("Failed to create index idx_fair_date: {e}");
    }

    Ok(())
}

/// Create the configured administrator if no account uses that email yet.
///
/// Does nothing unless both `admin_email` and `admin_password` are set.
pub async fn bootstrap_admin(db: &DatabaseConnection, config: &BootstrapConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let email = normalize_email(email);
    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(config
            .admin_name
            .clone()
            .unwrap_or_else(|| "Administrator".into())),
        email: Set(email.clone()),
        password: Set(hash::hash_password(password)?),
        status: Set(AccountStatus::Approved),
        user_type: Set(UserType::Admin),
        sale_point_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(OnConflict::column(user::Column::Email).do_nothing().to_owned())
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!(%email, "Ensured bootstrap admin exists"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
