//! Connections HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::backend::authorization::RelationshipSnapshot;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{ActionResponse, PersonSummary, RelationStatus, UserId};

/// How `snapshot`'s owner relates to `other`
pub fn relation_status(snapshot: &RelationshipSnapshot, other: &UserId) -> RelationStatus {
    if snapshot.is_friend(other) {
        RelationStatus::Friends
    } else if snapshot.has_sent_to(other) {
        RelationStatus::RequestSent
    } else if snapshot.has_received_from(other) {
        RelationStatus::RequestReceived
    } else {
        RelationStatus::None
    }
}

/// GET /api/connections/people
///
/// Everyone except the caller, by name, with relation status and presence.
pub async fn list_people(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PersonSummary>>, BackendError> {
    let me = auth.id();
    let snapshot = state.store.relationships(me).await?;
    let people = state
        .store
        .list_users_except(me)
        .await?
        .into_iter()
        .map(|user| PersonSummary {
            status: relation_status(&snapshot, &user.id),
            online: state.directory.is_online(&user.id),
            id: user.id,
            name: user.name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            location: user.location,
        })
        .collect();
    Ok(Json(people))
}

/// POST /api/connections/request/{id}
pub async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(target): Path<UserId>,
) -> Result<Json<ActionResponse>, BackendError> {
    let me = auth.id();
    if me == target {
        return Err(BackendError::validation("Cannot connect to yourself"));
    }
    require_user(&state, target).await?;

    let snapshot = state.store.relationships(me).await?;
    match relation_status(&snapshot, &target) {
        RelationStatus::Friends => Err(BackendError::validation("Already friends")),
        RelationStatus::RequestReceived => {
            state.store.accept_request(me, target).await?;
            tracing::info!("[Backend] {} and {} are now friends (crossed requests)", me, target);
            Ok(Json(ActionResponse::new("Request accepted")))
        }
        RelationStatus::RequestSent | RelationStatus::None => {
            state.store.record_request(me, target).await?;
            tracing::info!("[Backend] Friend request {} -> {}", me, target);
            Ok(Json(ActionResponse::new("Request sent")))
        }
    }
}

/// POST /api/connections/accept/{id}
///
/// Only a request that was actually received can be accepted.
pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(from): Path<UserId>,
) -> Result<Json<ActionResponse>, BackendError> {
    let me = auth.id();
    require_user(&state, from).await?;
    let snapshot = state.store.relationships(me).await?;
    if !snapshot.has_received_from(&from) {
        return Err(BackendError::not_found("Request not found"));
    }
    state.store.accept_request(me, from).await?;
    tracing::info!("[Backend] {} accepted request from {}", me, from);
    Ok(Json(ActionResponse::new("Request accepted")))
}

/// POST /api/connections/ignore/{id}
///
/// Clearing a request that does not exist is a no-op.
pub async fn ignore_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(from): Path<UserId>,
) -> Result<Json<ActionResponse>, BackendError> {
    let me = auth.id();
    require_user(&state, from).await?;
    state.store.clear_request(me, from).await?;
    tracing::debug!("[Backend] {} ignored request from {}", me, from);
    Ok(Json(ActionResponse::new("Request ignored")))
}

async fn require_user(state: &AppState, id: UserId) -> Result<(), BackendError> {
    match state.store.user_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(BackendError::not_found("User not found")),
    }
}
