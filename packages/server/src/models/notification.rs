use chrono::{DateTime, Utc};
use common::NotificationType;
use serde::Serialize;
use uuid::Uuid;

use crate::entity::notification;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub action_url: Option<String>,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(m: notification::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            message: m.message,
            notification_type: m.notification_type,
            is_read: m.is_read,
            action_url: m.action_url,
            metadata: m.metadata,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MarkAllReadResponse {
    /// Number of notifications that flipped to read.
    pub updated: u64,
}
