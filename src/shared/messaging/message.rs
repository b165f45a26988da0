//! Message Records
//!
//! Persisted direct and group messages. Both are created by the fan-out engine
//! at send time and are immutable afterwards; the only mutation is a hard
//! delete. Field names serialize in camelCase because they are part of the
//! real-time wire contract (`direct-message-delivered`,
//! `group-message-delivered`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, MessageId, UserId};

/// A message between two users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    /// Identity assigned on persistence
    pub id: MessageId,
    /// Sender
    pub from: UserId,
    /// Recipient
    pub to: UserId,
    /// Message text
    pub content: String,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

/// A message posted to a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessage {
    /// Identity assigned on persistence
    pub id: MessageId,
    /// Group the message belongs to
    pub group: GroupId,
    /// Author
    pub sender: UserId,
    /// Message text
    pub content: String,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

/// Group message as returned by the history endpoint, with the author's
/// display name resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageView {
    #[serde(flatten)]
    pub message: GroupMessage,
    /// Author's name at read time (empty when the author no longer exists)
    pub sender_name: String,
}

/// Response for a single deletion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedResponse {
    pub message: String,
    pub id: MessageId,
}

/// Response for a conversation wipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationDeletedResponse {
    pub message: String,
    pub deleted: usize,
}
