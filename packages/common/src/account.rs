#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// Lifecycle of a merchant account, driven by document review and sale-point occupancy.
///
/// `PENDING -> APPROVED -> ACTIVE -> INACTIVE`, with `DISAPPROVED` reachable from review.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Registered, documents not yet reviewed.
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PENDING"))]
    Pending,
    /// Documents approved; waiting for a sale point.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "APPROVED"))]
    Approved,
    /// Occupies a sale point.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ACTIVE"))]
    Active,
    /// Documents rejected.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "DISAPPROVED"))]
    Disapproved,
    /// Left the fair or was removed from a sale point.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "INACTIVE"))]
    Inactive,
}

impl AccountStatus {
    pub const ALL: &'static [AccountStatus] = &[
        Self::Pending,
        Self::Approved,
        Self::Active,
        Self::Disapproved,
        Self::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Active => "ACTIVE",
            Self::Disapproved => "DISAPPROVED",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|v| v.as_str()).collect();
                ParseEnumError::new("account status", s, &valid)
            })
    }
}

/// Kind of account. Everything except `Admin` is a merchant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ADMIN"))]
    Admin,
    /// Rural producer.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PRODUTOR_RURAL"))]
    ProdutorRural,
    /// Food vendor.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "GASTRONOMO"))]
    Gastronomo,
    /// Craft producer.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PRODUTOR_ARTESANAL"))]
    ProdutorArtesanal,
}

impl UserType {
    pub const ALL: &'static [UserType] = &[
        Self::Admin,
        Self::ProdutorRural,
        Self::Gastronomo,
        Self::ProdutorArtesanal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::ProdutorRural => "PRODUTOR_RURAL",
            Self::Gastronomo => "GASTRONOMO",
            Self::ProdutorArtesanal => "PRODUTOR_ARTESANAL",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn is_merchant(&self) -> bool {
        !self.is_admin()
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|v| v.as_str()).collect();
                ParseEnumError::new("user type", s, &valid)
            })
    }
}
