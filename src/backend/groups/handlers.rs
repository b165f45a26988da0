//! Group CRUD Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::load_group;
use crate::backend::authorization::{can_moderate_group, GroupSnapshot};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::NewGroup;
use crate::shared::messaging::{
    ActionResponse, CreateGroupRequest, Group, GroupId, GroupSummary, UpdateGroupRequest,
};

/// GET /api/groups
///
/// Every group, each tagged with the caller's role in it.
pub async fn list_groups(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<GroupSummary>>, BackendError> {
    let me = auth.id();
    let groups = state.store.list_groups().await?;
    Ok(Json(groups.iter().map(|g| GroupSummary::for_user(g, me)).collect()))
}

/// POST /api/groups
///
/// The caller becomes admin and first member.
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), BackendError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(BackendError::validation("Name required"));
    }

    let group = state
        .store
        .create_group(NewGroup {
            name: name.to_string(),
            description: request.description.as_deref().map(str::trim).unwrap_or_default().to_string(),
            logo_url: request.logo_url.as_deref().map(str::trim).unwrap_or_default().to_string(),
            admin: auth.id(),
        })
        .await?;

    tracing::info!("[Backend] Group {} ({}) created by {}", group.name, group.id, group.admin);
    Ok((StatusCode::CREATED, Json(group)))
}

/// PUT /api/groups/{id}
pub async fn update_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<GroupId>,
    Json(update): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, BackendError> {
    let group = load_group(&state, id).await?;
    can_moderate_group(&GroupSnapshot::from(&group), &auth.id())?;

    let group = state
        .store
        .update_group(id, &update)
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))?;
    Ok(Json(group))
}

/// DELETE /api/groups/{id}
///
/// Removes the group with its messages and closes its live channel.
pub async fn delete_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<GroupId>,
) -> Result<Json<ActionResponse>, BackendError> {
    let group = load_group(&state, id).await?;
    can_moderate_group(&GroupSnapshot::from(&group), &auth.id())?;

    if state.store.delete_group(id).await? {
        state.fanout.notify_group_deleted(id);
        tracing::info!("[Backend] Group {} deleted", id);
    }
    Ok(Json(ActionResponse::new("Group deleted")))
}
