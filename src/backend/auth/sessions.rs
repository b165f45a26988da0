/**
 * Session Management and JWT Tokens
 *
 * Tokens are HS256 JWTs signed with `ServerConfig::jwt_secret` and valid for
 * `ServerConfig::token_ttl_days`. The subject is the user id.
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::server::config::ServerConfig;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Token issuing errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token lifetime of {0} days is out of range")]
    Lifetime(u64),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Create a JWT token for a user
pub fn create_token(config: &ServerConfig, user_id: Uuid, email: &str) -> Result<String, TokenError> {
    let now = Utc::now().timestamp().max(0) as u64;
    let exp = config
        .token_ttl_days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|ttl| now.checked_add(ttl))
        .ok_or(TokenError::Lifetime(config.token_ttl_days))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp,
        iat: now,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Verify and decode a JWT token
pub fn verify_token(config: &ServerConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(token_data.claims)
}
