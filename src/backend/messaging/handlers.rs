//! Messaging HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::backend::authorization::can_delete_message;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::messaging::{
    ConversationDeletedResponse, DeletedResponse, DirectMessage, MessageId, UserId,
};

/// GET /api/messages/{other_id}
///
/// Full conversation between the caller and `other_id`, oldest first.
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(other): Path<UserId>,
) -> Result<Json<Vec<DirectMessage>>, BackendError> {
    let messages = state.store.conversation(auth.id(), other).await?;
    Ok(Json(messages))
}

/// DELETE /api/messages/conversation/{other_id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(other): Path<UserId>,
) -> Result<Json<ConversationDeletedResponse>, BackendError> {
    let me = auth.id();
    let deleted = state.store.delete_conversation(me, other).await?;

    tracing::info!("[Backend] Deleted {} message(s) between {} and {}", deleted.len(), me, other);
    state.fanout.notify_direct_deleted(me, other, &deleted);

    Ok(Json(ConversationDeletedResponse {
        message: "Conversation deleted".to_string(),
        deleted: deleted.len(),
    }))
}

/// DELETE /api/messages/{id}
///
/// Only the sender may delete a direct message.
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MessageId>,
) -> Result<Json<DeletedResponse>, BackendError> {
    let message = state
        .store
        .direct_message(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;

    can_delete_message(&message.from, &auth.id(), None)?;

    if state.store.delete_direct_message(id).await? {
        state.fanout.notify_direct_deleted(message.from, message.to, &[id]);
    }

    Ok(Json(DeletedResponse {
        message: "Message deleted".to_string(),
        id,
    }))
}
