use chrono::{DateTime, Utc};
use common::{AccountStatus, DocumentType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::document;
use crate::error::AppError;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: DocumentType,
    pub original_filename: String,
    pub file_extension: Option<String>,
    pub content_type: String,
    pub file_size: i64,
    /// SHA-256 hex of the stored bytes.
    pub checksum: String,
    pub status: AccountStatus,
    pub uploaded_at: DateTime<Utc>,
}

impl From<document::Model> for DocumentResponse {
    fn from(m: document::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            document_type: m.document_type,
            original_filename: m.original_filename,
            file_extension: m.file_extension,
            content_type: m.content_type,
            file_size: m.file_size,
            checksum: m.checksum,
            status: m.status,
            uploaded_at: m.uploaded_at,
        }
    }
}

/// Admin decision on a single document.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct DocumentReviewRequest {
    /// `APPROVED` or `DISAPPROVED`.
    pub status: AccountStatus,
}

pub fn validate_document_review(payload: &DocumentReviewRequest) -> Result<(), AppError> {
    match payload.status {
        AccountStatus::Approved | AccountStatus::Disapproved => Ok(()),
        other => Err(AppError::Validation(format!(
            "Document status must be APPROVED or DISAPPROVED, got {other}"
        ))),
    }
}
