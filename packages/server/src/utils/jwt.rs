use anyhow::{Result, bail};
use chrono::{Duration, Utc};
use common::UserType;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which cookie a token was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String, // Email
    pub user_id: Uuid,
    pub user_type: UserType,
    pub token_type: TokenType,
    pub iat: usize,
    pub exp: usize, // Expiration timestamp
}

/// Sign a new JWT for a user, valid for `ttl_secs` seconds.
pub fn sign(
    user_id: Uuid,
    email: &str,
    user_type: UserType,
    token_type: TokenType,
    ttl_secs: i64,
    secret: &str,
) -> Result<String> {
    let now = Utc::now();
    let Some(expiration) = now.checked_add_signed(Duration::seconds(ttl_secs)) else {
        bail!("token expiry out of range");
    };

    let claims = Claims {
        sub: email.to_owned(),
        user_id,
        user_type,
        token_type,
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT, requiring it to be of `expected` type.
pub fn verify(token: &str, secret: &str, expected: TokenType) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if token_data.claims.token_type != expected {
        bail!(
            "expected {:?} token, got {:?}",
            expected,
            token_data.claims.token_type
        );
    }
    Ok(token_data.claims)
}
