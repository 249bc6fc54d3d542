use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{validate_optional_text, validate_text};
use crate::entity::address;
use crate::error::AppError;

/// Create or replace an address.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AddressRequest {
    #[schema(example = "Rua das Flores")]
    pub street: String,
    #[schema(example = "Centro")]
    pub neighborhood: String,
    #[schema(example = "123")]
    pub number: Option<String>,
    pub reference: Option<String>,
    #[schema(example = "12345-678")]
    pub cep: Option<String>,
    #[schema(example = "Vila Velha")]
    pub city: String,
}

pub fn validate_address(payload: &AddressRequest) -> Result<(), AppError> {
    validate_text(&payload.street, "Street", 255)?;
    validate_text(&payload.neighborhood, "Neighborhood", 255)?;
    validate_text(&payload.city, "City", 255)?;
    validate_optional_text(payload.number.as_deref(), "Number", 20)?;
    validate_optional_text(payload.reference.as_deref(), "Reference", 1000)?;
    if let Some(cep) = payload.cep.as_deref().map(str::trim)
        && !cep.is_empty()
        && !is_valid_cep(cep)
    {
        return Err(AppError::Validation(
            "CEP must be 8 digits, optionally formatted 00000-000".into(),
        ));
    }
    Ok(())
}

fn is_valid_cep(cep: &str) -> bool {
    let digits: String = cep.chars().filter(|c| *c != '-').collect();
    let dash_ok = match cep.find('-') {
        None => true,
        Some(pos) => pos == 5 && cep.matches('-').count() == 1,
    };
    dash_ok && digits.len() == 8 && digits.chars().all(|c| c.is_ascii_digit())
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: Uuid,
    pub street: String,
    pub neighborhood: String,
    pub number: Option<String>,
    pub reference: Option<String>,
    pub cep: Option<String>,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<address::Model> for AddressResponse {
    fn from(m: address::Model) -> Self {
        Self {
            id: m.id,
            street: m.street,
            neighborhood: m.neighborhood,
            number: m.number,
            reference: m.reference,
            cep: m.cep,
            city: m.city,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
