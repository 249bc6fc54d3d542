#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an absence entered the system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbsenceType {
    /// Announced in advance by the merchant.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "NOTIFIED"))]
    Notified,
    /// Recorded by an admin after the fair.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "REGISTERED"))]
    Registered,
}

impl AbsenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notified => "NOTIFIED",
            Self::Registered => "REGISTERED",
        }
    }
}

impl fmt::Display for AbsenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an absence sits in the justification workflow.
///
/// Derived from the justification's approval flag, never stored. This is the
/// value clients should branch on: `accepted = false` alone cannot tell a
/// pending review from a rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JustificationStanding {
    NoJustification,
    PendingReview,
    Accepted,
    Rejected,
}

impl JustificationStanding {
    /// `justification` is `None` when no justification exists, otherwise
    /// `Some(approved)` with the tri-state approval flag.
    pub fn derive(justification: Option<Option<bool>>) -> Self {
        match justification {
            None => Self::NoJustification,
            Some(None) => Self::PendingReview,
            Some(Some(true)) => Self::Accepted,
            Some(Some(false)) => Self::Rejected,
        }
    }
}
