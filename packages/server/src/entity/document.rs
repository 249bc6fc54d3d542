use common::{AccountStatus, DocumentType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Onboarding document metadata. The bytes live in the file store under `storage_key`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,

    pub document_type: DocumentType,
    pub storage_key: String,
    pub original_filename: String,
    pub file_extension: Option<String>,
    pub content_type: String,
    pub file_size: i64,
    /// SHA-256 hex of the stored bytes.
    pub checksum: String,
    pub status: AccountStatus,

    pub uploaded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
