/**
 * Real-time Event Protocol
 *
 * Every frame on the `/ws` channel is a JSON text frame of the form
 * `{"event": "<name>", "data": {...}}`. Event names are kebab-case and
 * payload fields camelCase; both are part of the client contract. The socket
 * is opened with the user's JWT and may only announce that user.
 *
 * # Client → Server
 *
 * - `announce-identity` `{ userId }`
 * - `send-direct-message` `{ from, to, content }`
 * - `subscribe-group-channel` / `unsubscribe-group-channel` `{ groupId }`
 * - `send-group-message` `{ groupId, from, content }`
 *
 * # Server → Client
 *
 * - `identity-announced` `{ userId }`
 * - `direct-message-delivered` `{ id, from, to, content, createdAt }`
 * - `group-channel-subscribed` `{ groupId }`
 * - `group-message-delivered` `{ id, group, sender, content, createdAt }`
 * - `message-deleted` `{ id }` or `{ id, group }`
 * - `rejected` `{ event, reason, message }`
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::messaging::{DirectMessage, GroupId, GroupMessage, MessageId, UserId};

/// `announce-identity` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnnounceIdentity {
    pub user_id: UserId,
}

/// `send-direct-message` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendDirectMessage {
    pub from: UserId,
    pub to: UserId,
    pub content: String,
}

/// `subscribe-group-channel` / `unsubscribe-group-channel` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupChannel {
    pub group_id: GroupId,
}

/// `send-group-message` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendGroupMessage {
    pub group_id: GroupId,
    pub from: UserId,
    pub content: String,
}

/// `message-deleted` payload. `group` is set for group messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeleted {
    pub id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
}

/// `rejected` payload: the outcome of an action that did not go through
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// Name of the client event that was refused
    pub event: String,
    /// Machine-readable reason code (`not_member`, `internal`, ...)
    pub reason: String,
    /// Human-readable explanation
    pub message: String,
}

impl Rejection {
    pub fn new(event: &str, reason: &str, message: impl Into<String>) -> Self {
        Self {
            event: event.to_string(),
            reason: reason.to_string(),
            message: message.into(),
        }
    }
}

/// Frames a client may send
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    AnnounceIdentity(AnnounceIdentity),
    SendDirectMessage(SendDirectMessage),
    SubscribeGroupChannel(GroupChannel),
    UnsubscribeGroupChannel(GroupChannel),
    SendGroupMessage(SendGroupMessage),
}

impl ClientEvent {
    pub const ANNOUNCE_IDENTITY: &'static str = "announce-identity";
    pub const SEND_DIRECT_MESSAGE: &'static str = "send-direct-message";
    pub const SUBSCRIBE_GROUP_CHANNEL: &'static str = "subscribe-group-channel";
    pub const UNSUBSCRIBE_GROUP_CHANNEL: &'static str = "unsubscribe-group-channel";
    pub const SEND_GROUP_MESSAGE: &'static str = "send-group-message";

    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::AnnounceIdentity(_) => Self::ANNOUNCE_IDENTITY,
            ClientEvent::SendDirectMessage(_) => Self::SEND_DIRECT_MESSAGE,
            ClientEvent::SubscribeGroupChannel(_) => Self::SUBSCRIBE_GROUP_CHANNEL,
            ClientEvent::UnsubscribeGroupChannel(_) => Self::UNSUBSCRIBE_GROUP_CHANNEL,
            ClientEvent::SendGroupMessage(_) => Self::SEND_GROUP_MESSAGE,
        }
    }

    /// Decode a text frame
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Frames the server emits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    IdentityAnnounced(AnnounceIdentity),
    DirectMessageDelivered(DirectMessage),
    GroupChannelSubscribed(GroupChannel),
    GroupMessageDelivered(GroupMessage),
    MessageDeleted(MessageDeleted),
    Rejected(Rejection),
}

impl ServerEvent {
    /// Encode as a text frame
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build a `rejected` frame
    pub fn rejected(event: &str, reason: &str, message: impl Into<String>) -> Self {
        ServerEvent::Rejected(Rejection::new(event, reason, message))
    }
}
