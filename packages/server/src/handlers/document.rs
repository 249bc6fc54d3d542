use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use common::{AccountStatus, DocumentType, NotificationType};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::document;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::document::*;
use crate::state::AppState;
use crate::utils::filename::file_extension;
use crate::utils::lookup;
use crate::utils::notify::{self, Notice};
use crate::utils::upload::{
    UploadedFile, binary_response, multipart_error, read_file_field, read_text_field,
};

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Documents",
    operation_id = "uploadDocument",
    summary = "Upload an onboarding document",
    description = "Multipart form with `documentType` (RG, CPF, CAF, CNPJ or OTHER) and `file`. \
        Uploading a type the caller already has replaces the previous document and its file.",
    request_body(content_type = "multipart/form-data", description = "`documentType` and `file`"),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn upload_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // Nothing reaches the file store for a deleted account.
    lookup::find_user(&state.db, auth_user.user_id).await?;

    let limit = state.config.storage.max_upload_size;
    let mut document_type: Option<DocumentType> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        match field.name() {
            Some("documentType") => {
                let raw = read_text_field(field, "documentType").await?;
                document_type = Some(
                    raw.parse()
                        .map_err(|e: common::ParseEnumError| AppError::Validation(e.to_string()))?,
                );
            }
            Some("file") => {
                file = read_file_field(field, limit).await?;
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let document_type = document_type
        .ok_or_else(|| AppError::Validation("Missing 'documentType' field".into()))?;
    let file = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let extension = file_extension(&file.filename);
    let stored = state
        .file_store
        .put(
            &format!("documents/{}", auth_user.user_id),
            extension.as_deref(),
            &file.data,
        )
        .await?;

    let saved = async {
        let txn = state.db.begin().await?;
        let previous = document::Entity::find()
            .filter(document::Column::UserId.eq(auth_user.user_id))
            .filter(document::Column::DocumentType.eq(document_type))
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        if let Some(prev) = &previous {
            document::Entity::delete_by_id(prev.id).exec(&txn).await?;
        }

        let model = document::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(auth_user.user_id),
            document_type: Set(document_type),
            storage_key: Set(stored.key.clone()),
            original_filename: Set(file.filename.clone()),
            file_extension: Set(extension.clone()),
            content_type: Set(file.content_type.clone()),
            file_size: Set(i64::try_from(stored.size).unwrap_or(i64::MAX)),
            checksum: Set(stored.checksum.to_hex()),
            status: Set(AccountStatus::Pending),
            uploaded_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok::<_, AppError>((model, previous))
    }
    .await;

    let (model, previous) = match saved {
        Ok(v) => v,
        Err(e) => {
            if let Err(cleanup) = state.file_store.delete(&stored.key).await {
                tracing::warn!(key = %stored.key, "Failed to remove orphaned upload: {cleanup}");
            }
            return Err(e);
        }
    };

    if let Some(prev) = previous
        && let Err(e) = state.file_store.delete(&prev.storage_key).await
    {
        tracing::warn!(key = %prev.storage_key, "Failed to remove replaced document: {e}");
    }

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Documents",
    operation_id = "listMyDocuments",
    summary = "List the caller's documents",
    responses(
        (status = 200, description = "Documents", body = Vec<DocumentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let docs = documents_of(&state.db, auth_user.user_id).await?;
    Ok(Json(docs))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Documents",
    operation_id = "listUserDocuments",
    summary = "List a user's documents",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Documents", body = Vec<DocumentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id))]
pub async fn list_user_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    auth_user.require_admin()?;
    lookup::find_user(&state.db, user_id).await?;
    Ok(Json(documents_of(&state.db, user_id).await?))
}

async fn documents_of<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<DocumentResponse>, AppError> {
    Ok(document::Entity::find()
        .filter(document::Column::UserId.eq(user_id))
        .order_by_asc(document::Column::DocumentType)
        .all(db)
        .await?
        .into_iter()
        .map(DocumentResponse::from)
        .collect())
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Documents",
    operation_id = "getDocument",
    summary = "Get document metadata",
    description = "Available to the owner and to admins.",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document", body = DocumentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = lookup::find_document(&state.db, id).await?;
    auth_user.require_owner_or_admin(doc.user_id)?;
    Ok(Json(doc.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/download",
    tag = "Documents",
    operation_id = "downloadDocument",
    summary = "Download a document",
    description = "Available to the owner and to admins.",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document or stored file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn download_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let doc = lookup::find_document(&state.db, id).await?;
    auth_user.require_owner_or_admin(doc.user_id)?;

    let data = state.file_store.get(&doc.storage_key).await?;
    binary_response(data, &doc.content_type, Some(&doc.original_filename))
}

#[utoipa::path(
    put,
    path = "/{id}/review",
    tag = "Documents",
    operation_id = "reviewDocument",
    summary = "Approve or disapprove a document",
    description = "The owner receives an `APPROVAL` notification.",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = DocumentReviewRequest,
    responses(
        (status = 200, description = "Document reviewed", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, status = %payload.status))]
pub async fn review_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<DocumentReviewRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    auth_user.require_admin()?;
    validate_document_review(&payload)?;

    let txn = state.db.begin().await?;
    let doc = lookup::find_document(&txn, id).await?;
    let mut active: document::ActiveModel = doc.into();
    active.status = Set(payload.status);
    let doc = active.update(&txn).await?;

    let verdict = if payload.status == AccountStatus::Approved {
        "approved"
    } else {
        "disapproved"
    };
    notify::push(
        &txn,
        doc.user_id,
        &Notice {
            kind: NotificationType::Approval,
            title: "Document reviewed",
            message: format!("Your {} document was {verdict}.", doc.document_type),
            action_url: Some("/documents"),
        },
    )
    .await?;
    txn.commit().await?;

    Ok(Json(doc.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Documents",
    operation_id = "deleteDocument",
    summary = "Delete one of the caller's documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let doc = lookup::find_document(&state.db, id).await?;
    if doc.user_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let key = doc.storage_key.clone();
    doc.delete(&state.db).await?;
    if !state.file_store.delete(&key).await? {
        tracing::warn!(%key, "Stored file was already gone");
    }

    Ok(StatusCode::NO_CONTENT)
}
