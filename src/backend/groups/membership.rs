//! Group Membership Handlers
//!
//! | Route                               | Who        | Effect                     |
//! |-------------------------------------|------------|----------------------------|
//! | `POST /{id}/join`                   | non-member | added to pending           |
//! | `POST /{id}/approve/{user_id}`      | admin      | pending → member           |
//! | `POST /{id}/reject/{user_id}`       | admin      | removed from pending       |
//! | `POST /{id}/add-member/{user_id}`   | admin      | added as member directly   |
//! | `POST /{id}/remove-member/{user_id}`| admin      | removed, live channel left |
//! | `GET /{id}/members`                 | members    | admin, members, pending    |

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};

use super::load_group;
use crate::backend::authorization::{
    can_join_group, can_moderate_group, can_read_group, can_remove_member, GroupSnapshot,
};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{
    ActionResponse, GroupId, GroupMembersResponse, MemberSummary, Membership, UserId,
};

pub async fn join_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<GroupId>,
) -> Result<Json<ActionResponse>, BackendError> {
    let me = auth.id();
    let group = load_group(&state, id).await?;
    can_join_group(&GroupSnapshot::from(&group), &me)?;

    state.store.set_membership(id, me, Membership::Pending).await?;
    tracing::info!("[Backend] {} asked to join group {}", me, id);
    Ok(Json(ActionResponse::new("Join request sent")))
}

pub async fn approve_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user)): Path<(GroupId, UserId)>,
) -> Result<Json<ActionResponse>, BackendError> {
    let group = load_group(&state, id).await?;
    can_moderate_group(&GroupSnapshot::from(&group), &auth.id())?;
    require_user(&state, user).await?;

    state.store.set_membership(id, user, Membership::Member).await?;
    tracing::info!("[Backend] {} approved into group {}", user, id);
    Ok(Json(ActionResponse::new("Member approved")))
}

/// Only clears a pending request; members are untouched
pub async fn reject_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user)): Path<(GroupId, UserId)>,
) -> Result<Json<ActionResponse>, BackendError> {
    let group = load_group(&state, id).await?;
    let snapshot = GroupSnapshot::from(&group);
    can_moderate_group(&snapshot, &auth.id())?;

    if snapshot.is_pending(&user) {
        state.store.set_membership(id, user, Membership::Removed).await?;
    }
    Ok(Json(ActionResponse::new("Request rejected")))
}

pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user)): Path<(GroupId, UserId)>,
) -> Result<Json<ActionResponse>, BackendError> {
    let group = load_group(&state, id).await?;
    can_moderate_group(&GroupSnapshot::from(&group), &auth.id())?;
    require_user(&state, user).await?;

    state.store.set_membership(id, user, Membership::Member).await?;
    tracing::info!("[Backend] {} added to group {}", user, id);
    Ok(Json(ActionResponse::new("Member added")))
}

/// Removes the user and drops their live subscriptions to the group
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user)): Path<(GroupId, UserId)>,
) -> Result<Json<ActionResponse>, BackendError> {
    let group = load_group(&state, id).await?;
    can_remove_member(&GroupSnapshot::from(&group), &auth.id(), &user)?;

    state.store.set_membership(id, user, Membership::Removed).await?;
    state.fanout.notify_member_removed(id, user);
    tracing::info!("[Backend] {} removed from group {}", user, id);
    Ok(Json(ActionResponse::new("Member removed")))
}

pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<GroupId>,
) -> Result<Json<GroupMembersResponse>, BackendError> {
    let group = load_group(&state, id).await?;
    can_read_group(&GroupSnapshot::from(&group), &auth.id())?;

    let mut ids = vec![group.admin];
    ids.extend(group.members.iter().chain(group.pending_members.iter()).copied());
    let users: HashMap<UserId, MemberSummary> = state
        .store
        .users_by_ids(&ids)
        .await?
        .iter()
        .map(|u| (u.id, u.member_summary()))
        .collect();

    let resolve = |ids: &[UserId]| -> Vec<MemberSummary> {
        ids.iter().filter_map(|id| users.get(id).cloned()).collect()
    };

    Ok(Json(GroupMembersResponse {
        admin: users.get(&group.admin).cloned(),
        members: resolve(&group.members),
        pending_members: resolve(&group.pending_members),
    }))
}

async fn require_user(state: &AppState, id: UserId) -> Result<(), BackendError> {
    match state.store.user_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(BackendError::not_found("User not found")),
    }
}
