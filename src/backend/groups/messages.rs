//! Group Message Handlers
//!
//! Posting happens over the real-time channel; HTTP serves history and
//! deletion.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};

use super::load_group;
use crate::backend::authorization::{can_delete_message, can_read_group, GroupSnapshot};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{DeletedResponse, GroupId, GroupMessageView, MessageId, UserId};

/// GET /api/groups/{id}/messages
///
/// Members only, oldest first, each with the sender's current name.
pub async fn group_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<GroupId>,
) -> Result<Json<Vec<GroupMessageView>>, BackendError> {
    let group = load_group(&state, id).await?;
    can_read_group(&GroupSnapshot::from(&group), &auth.id())?;

    let messages = state.store.group_messages(id).await?;

    let mut senders: Vec<UserId> = messages.iter().map(|m| m.sender).collect();
    senders.sort_unstable();
    senders.dedup();
    let names: HashMap<UserId, String> = state
        .store
        .users_by_ids(&senders)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    let views = messages
        .into_iter()
        .map(|message| GroupMessageView {
            sender_name: names.get(&message.sender).cloned().unwrap_or_default(),
            message,
        })
        .collect();
    Ok(Json(views))
}

/// DELETE /api/group-messages/{id}
///
/// Allowed for the sender and for the group's admin.
pub async fn delete_group_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MessageId>,
) -> Result<Json<DeletedResponse>, BackendError> {
    let message = state
        .store
        .group_message(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;
    let group = load_group(&state, message.group).await?;

    can_delete_message(&message.sender, &auth.id(), Some(&GroupSnapshot::from(&group)))?;

    if state.store.delete_group_message(id).await? {
        state.fanout.notify_group_message_deleted(group.id, id);
    }

    Ok(Json(DeletedResponse {
        message: "Group message deleted".to_string(),
        id,
    }))
}
