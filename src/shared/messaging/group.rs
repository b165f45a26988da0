//! Group Data Structures
//!
//! A group has exactly one admin, an ordered member list and an ordered list
//! of users waiting for approval. The creator becomes admin and first member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, UserId};

/// A persisted group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    /// Creator and sole moderator
    pub admin: UserId,
    /// Approved members, in approval order
    pub members: Vec<UserId>,
    /// Users who asked to join and wait for the admin
    pub pending_members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// The caller's relation to this group, admin first
    pub fn role_of(&self, user: UserId) -> GroupRole {
        if self.admin == user {
            GroupRole::Admin
        } else if self.members.contains(&user) {
            GroupRole::Member
        } else if self.pending_members.contains(&user) {
            GroupRole::Pending
        } else {
            GroupRole::None
        }
    }
}

/// A user's standing in a group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Admin,
    Member,
    Pending,
    None,
}

/// Membership state written by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Approved member; clears any pending entry
    Member,
    /// Waiting for approval; ignored when already a member
    Pending,
    /// Neither member nor pending
    Removed,
}

/// Group as listed for a particular caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub admin: UserId,
    pub role: GroupRole,
}

impl GroupSummary {
    pub fn for_user(group: &Group, user: UserId) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            logo_url: group.logo_url.clone(),
            admin: group.admin,
            role: group.role_of(user),
        }
    }
}

/// Fields for a new group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Partial update applied by the admin. A blank name is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// Minimal user card used in member listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Response for `GET /api/groups/{id}/members`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembersResponse {
    pub admin: Option<MemberSummary>,
    pub members: Vec<MemberSummary>,
    pub pending_members: Vec<MemberSummary>,
}
