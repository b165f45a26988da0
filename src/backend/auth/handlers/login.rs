/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * Unknown email and wrong password both answer 401 "Invalid credentials", so
 * the response does not reveal which accounts exist.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::normalize_email;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let email = normalize_email(&request.email);
    tracing::info!("[Backend] Login request for: {}", email);

    let user = state.store.user_by_email(&email).await?.ok_or_else(|| {
        tracing::warn!("[Backend] Login for unknown email: {}", email);
        BackendError::unauthorized("Invalid credentials")
    })?;

    let valid = bcrypt::verify(&request.password, &user.password_hash).map_err(BackendError::internal)?;
    if !valid {
        tracing::warn!("[Backend] Invalid password for user: {}", user.id);
        return Err(BackendError::unauthorized("Invalid credentials"));
    }

    let token = create_token(&state.config, user.id, &user.email).map_err(BackendError::internal)?;

    tracing::info!("[Backend] User logged in: {} ({})", user.name, user.id);

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}
