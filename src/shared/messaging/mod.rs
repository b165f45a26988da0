//! Messaging Module
//!
//! Data structures shared by the HTTP handlers and the real-time engine:
//!
//! - `DirectMessage` / `GroupMessage` - persisted messages
//! - `Group` - a moderated group and its membership lists
//! - `RelationStatus` / `PersonSummary` - the people directory
//!
//! All identities are opaque UUIDs serialized as strings.

pub mod group;
pub mod message;
pub mod relationship;

use uuid::Uuid;

/// Identity of a user
pub type UserId = Uuid;
/// Identity of a group
pub type GroupId = Uuid;
/// Identity of a persisted message (direct or group)
pub type MessageId = Uuid;

pub use group::{
    CreateGroupRequest, Group, GroupMembersResponse, GroupRole, GroupSummary, MemberSummary,
    Membership, UpdateGroupRequest,
};
pub use message::{
    ConversationDeletedResponse, DeletedResponse, DirectMessage, GroupMessage, GroupMessageView,
};
pub use relationship::{ActionResponse, PersonSummary, RelationStatus};
