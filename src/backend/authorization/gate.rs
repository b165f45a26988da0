/**
 * Authorization Gate
 *
 * Stateless decision functions shared by the HTTP handlers and the real-time
 * fan-out engine, so both paths agree on who may do what. None of these
 * functions perform I/O; callers load a snapshot first.
 *
 * Admin status always dominates membership for moderation, and a sender may
 * always delete their own message regardless of group role.
 */

use thiserror::Error;

use super::snapshot::{GroupSnapshot, RelationshipSnapshot};
use crate::shared::messaging::UserId;

/// Why an action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("Users are not friends")]
    NotFriends,
    #[error("Not a member of this group")]
    NotMember,
    #[error("Only the group admin can do this")]
    NotAdmin,
    #[error("Not allowed to delete this message")]
    Forbidden,
    #[error("Already a member")]
    AlreadyMember,
    #[error("Already requested to join")]
    AlreadyPending,
    #[error("Cannot remove admin")]
    CannotRemoveAdmin,
}

/// Error category a denial maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyKind {
    Forbidden,
    Conflict,
    Validation,
}

impl DenyReason {
    /// Reason code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NotFriends => "not_friends",
            DenyReason::NotMember => "not_member",
            DenyReason::NotAdmin => "not_admin",
            DenyReason::Forbidden => "forbidden",
            DenyReason::AlreadyMember => "already_member",
            DenyReason::AlreadyPending => "already_pending",
            DenyReason::CannotRemoveAdmin => "cannot_remove_admin",
        }
    }

    pub fn kind(&self) -> DenyKind {
        match self {
            DenyReason::NotFriends
            | DenyReason::NotMember
            | DenyReason::NotAdmin
            | DenyReason::Forbidden => DenyKind::Forbidden,
            DenyReason::AlreadyMember | DenyReason::AlreadyPending => DenyKind::Conflict,
            DenyReason::CannotRemoveAdmin => DenyKind::Validation,
        }
    }
}

/// Outcome of a gate check
pub type Decision = Result<(), DenyReason>;

/// Direct messages may be exchanged with friends only
pub fn can_exchange_direct_message(relationship: &RelationshipSnapshot, other: &UserId) -> Decision {
    if relationship.is_friend(other) {
        Ok(())
    } else {
        Err(DenyReason::NotFriends)
    }
}

/// Admin or member may read (and post to) a group
pub fn can_read_group(group: &GroupSnapshot, actor: &UserId) -> Decision {
    if group.is_admin(actor) || group.is_member(actor) {
        Ok(())
    } else {
        Err(DenyReason::NotMember)
    }
}

/// Only the admin moderates
pub fn can_moderate_group(group: &GroupSnapshot, actor: &UserId) -> Decision {
    if group.is_admin(actor) {
        Ok(())
    } else {
        Err(DenyReason::NotAdmin)
    }
}

/// The sender may delete their message; a group admin may delete any message
/// in that group. `group` is `None` for direct messages.
pub fn can_delete_message(sender: &UserId, actor: &UserId, group: Option<&GroupSnapshot>) -> Decision {
    if sender == actor {
        return Ok(());
    }
    match group {
        Some(group) if group.is_admin(actor) => Ok(()),
        _ => Err(DenyReason::Forbidden),
    }
}

/// A user may ask to join when not admin, not a member and not already pending
pub fn can_join_group(group: &GroupSnapshot, actor: &UserId) -> Decision {
    if group.is_admin(actor) || group.is_member(actor) {
        return Err(DenyReason::AlreadyMember);
    }
    if group.is_pending(actor) {
        return Err(DenyReason::AlreadyPending);
    }
    Ok(())
}

/// The admin may remove anyone but themself
pub fn can_remove_member(group: &GroupSnapshot, actor: &UserId, target: &UserId) -> Decision {
    can_moderate_group(group, actor)?;
    if group.is_admin(target) {
        return Err(DenyReason::CannotRemoveAdmin);
    }
    Ok(())
}
