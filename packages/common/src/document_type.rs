#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// Kind of onboarding document a merchant uploads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// Identity card.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RG"))]
    Rg,
    /// Individual taxpayer registration.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CPF"))]
    Cpf,
    /// Family farmer registration, for rural producers.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CAF"))]
    Caf,
    /// Company registration, for food vendors.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CNPJ"))]
    Cnpj,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "OTHER"))]
    Other,
}

impl DocumentType {
    pub const ALL: &'static [DocumentType] =
        &[Self::Rg, Self::Cpf, Self::Caf, Self::Cnpj, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rg => "RG",
            Self::Cpf => "CPF",
            Self::Caf => "CAF",
            Self::Cnpj => "CNPJ",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|v| v.as_str()).collect();
                ParseEnumError::new("document type", s, &valid)
            })
    }
}
