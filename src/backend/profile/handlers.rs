//! Profile HTTP Handlers

use axum::{extract::State, Json};

use crate::backend::auth::users::{Profile, ProfileUpdate};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

/// GET /api/profile/me
pub async fn get_me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Profile>, BackendError> {
    let user = state
        .store
        .user_by_id(auth.id())
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    Ok(Json(user.profile()))
}

/// PUT /api/profile/me
///
/// Absent fields are left alone. A blank name is ignored rather than stored.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, BackendError> {
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        update.name = None;
    }

    let user = state
        .store
        .update_profile(auth.id(), &update)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    tracing::info!("[Backend] Profile updated for {}", user.id);
    Ok(Json(user.profile()))
}
