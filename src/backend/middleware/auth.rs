/**
 * Authentication Extractor
 *
 * Protected handlers take an `AuthUser` argument. Extraction:
 *
 * 1. reads the `Authorization: Bearer <token>` header
 * 2. verifies the JWT against the configured secret
 * 3. checks the user still exists in the store
 *
 * Any failure rejects the request with 401.
 */

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from the JWT
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Axum extractor for the authenticated user
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.user_id
    }
}

/// The bearer token from an `Authorization` header, if well formed
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify `token` and check that its user still exists
///
/// Shared by the `AuthUser` extractor and the `/ws` upgrade.
pub async fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedUser, BackendError> {
    let claims = verify_token(&state.config, token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized("Token is not valid")
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Token is not valid")
    })?;

    if state.store.user_by_id(user_id).await?.is_none() {
        tracing::warn!("Token for unknown user {}", user_id);
        return Err(BackendError::unauthorized("Token is not valid"));
    }

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::warn!("Missing or malformed Authorization header");
            BackendError::unauthorized("No token, authorization denied")
        })?;

        authenticate(state, token).await.map(AuthUser)
    }
}
