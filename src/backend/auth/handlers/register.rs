/**
 * Register Handler
 *
 * POST /api/auth/register
 *
 * 1. Validate name, email and password
 * 2. Hash the password with bcrypt
 * 3. Create the user (emails are unique, case-insensitively)
 * 4. Return a token and the profile with 201 Created
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest, MIN_PASSWORD_LEN};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{normalize_email, NewUser};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - blank name, malformed email or short password
/// * `409 Conflict` - the email is already registered
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(BackendError::validation("Name required"));
    }
    let email = normalize_email(&request.email);
    if !is_plausible_email(&email) {
        return Err(BackendError::validation("Valid email required"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BackendError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    tracing::info!("[Backend] Register request for: {}", email);

    let password_hash = bcrypt::hash(&request.password, state.config.bcrypt_cost).map_err(BackendError::internal)?;

    let user = state
        .store
        .create_user(NewUser {
            name: name.to_string(),
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => BackendError::conflict("User already exists"),
            other => other.into(),
        })?;

    let token = create_token(&state.config, user.id, &user.email).map_err(BackendError::internal)?;

    tracing::info!("[Backend] User registered: {} ({})", user.name, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}

/// One `@` with something on both sides and a dot in the domain
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
