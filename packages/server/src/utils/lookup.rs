use sea_orm::sea_query::LockType;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use uuid::Uuid;

use crate::entity::{
    absence, address, artist, attraction, course, document, fair, justification, sale_point,
    statement, user,
};
use crate::error::AppError;

/// Look up a user by ID, returning 404 if not found.
pub async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Same as [`find_user`], holding a row lock until the transaction ends.
pub async fn find_user_for_update<C: ConnectionTrait>(
    txn: &C,
    id: Uuid,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn find_address<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<address::Model, AppError> {
    address::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".into()))
}

/// 404 if an optional address reference points nowhere.
pub async fn ensure_address<C: ConnectionTrait>(
    db: &C,
    id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(id) = id {
        find_address(db, id).await?;
    }
    Ok(())
}

pub async fn find_sale_point<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<sale_point::Model, AppError> {
    sale_point::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale point not found".into()))
}

pub async fn find_fair<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<fair::Model, AppError> {
    fair::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fair not found".into()))
}

pub async fn find_artist<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<artist::Model, AppError> {
    artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".into()))
}

pub async fn find_attraction<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<attraction::Model, AppError> {
    attraction::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Attraction not found".into()))
}

pub async fn find_course<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<course::Model, AppError> {
    course::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

pub async fn find_absence<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<absence::Model, AppError> {
    absence::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Absence not found".into()))
}

pub async fn find_justification_for_update<C: ConnectionTrait>(
    txn: &C,
    id: Uuid,
) -> Result<justification::Model, AppError> {
    justification::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Justification not found".into()))
}

pub async fn find_statement<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<statement::Model, AppError> {
    statement::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Statement not found".into()))
}

pub async fn find_document<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<document::Model, AppError> {
    document::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))
}
