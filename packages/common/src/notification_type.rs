#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};

/// Category of a user notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "GENERAL"))]
    General,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ABSENCE"))]
    Absence,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "COURSE"))]
    Course,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "APPROVAL"))]
    Approval,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "FAIR"))]
    Fair,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SYSTEM"))]
    System,
}
