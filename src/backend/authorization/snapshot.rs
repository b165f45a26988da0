/**
 * Authorization Snapshots
 *
 * Read-only copies of relationship and group state taken for a single
 * decision. The store builds them; the gate only reads them.
 */

use std::collections::HashSet;

use crate::shared::messaging::{Group, GroupId, UserId};

/// A user's friend, outgoing-request and incoming-request sets
///
/// A given other user appears in at most one of the three sets. That is kept
/// by the relationship mutations in the store, not checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipSnapshot {
    pub friends: HashSet<UserId>,
    pub requests_sent: HashSet<UserId>,
    pub requests_received: HashSet<UserId>,
}

impl RelationshipSnapshot {
    pub fn is_friend(&self, other: &UserId) -> bool {
        self.friends.contains(other)
    }

    pub fn has_sent_to(&self, other: &UserId) -> bool {
        self.requests_sent.contains(other)
    }

    pub fn has_received_from(&self, other: &UserId) -> bool {
        self.requests_received.contains(other)
    }
}

/// Admin, members and pending members of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub admin: UserId,
    pub members: HashSet<UserId>,
    pub pending: HashSet<UserId>,
}

impl GroupSnapshot {
    pub fn is_admin(&self, user: &UserId) -> bool {
        &self.admin == user
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    pub fn is_pending(&self, user: &UserId) -> bool {
        self.pending.contains(user)
    }
}

impl From<&Group> for GroupSnapshot {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            admin: group.admin,
            members: group.members.iter().copied().collect(),
            pending: group.pending_members.iter().copied().collect(),
        }
    }
}
