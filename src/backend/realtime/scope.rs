/**
 * Group Broadcast Scope
 *
 * For each group, the set of live connections that subscribed to its channel
 * this session. Fan-out for group messages targets this set, not the
 * persisted member list: a member who never subscribed receives nothing
 * live, and membership is checked by the caller before `subscribe`.
 */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::directory::{ConnectionHandle, ConnectionId};
use crate::shared::messaging::{GroupId, UserId};
use crate::shared::ServerEvent;

#[derive(Debug, Clone)]
struct Subscriber {
    user: UserId,
    handle: ConnectionHandle,
}

/// `GroupId -> { ConnectionId -> (UserId, ConnectionHandle) }`
#[derive(Debug, Clone, Default)]
pub struct BroadcastScope {
    groups: Arc<RwLock<HashMap<GroupId, HashMap<ConnectionId, Subscriber>>>>,
}

impl BroadcastScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a group's scope; re-subscribing is a no-op
    pub fn subscribe(&self, group: GroupId, user: UserId, handle: ConnectionHandle) {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        groups
            .entry(group)
            .or_default()
            .insert(handle.id(), Subscriber { user, handle });
    }

    /// Remove one connection from one group; true if it was subscribed
    pub fn unsubscribe(&self, group: &GroupId, connection: ConnectionId) -> bool {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        let Some(subscribers) = groups.get_mut(group) else {
            return false;
        };
        let removed = subscribers.remove(&connection).is_some();
        if subscribers.is_empty() {
            groups.remove(group);
        }
        removed
    }

    /// Remove a closing connection from every scope
    pub fn remove_connection(&self, connection: ConnectionId) {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        groups.retain(|_, subscribers| {
            subscribers.remove(&connection);
            !subscribers.is_empty()
        });
    }

    /// Drop every subscription `user` holds on `group`; returns how many
    pub fn evict_user(&self, group: &GroupId, user: &UserId) -> usize {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        let Some(subscribers) = groups.get_mut(group) else {
            return 0;
        };
        let before = subscribers.len();
        subscribers.retain(|_, s| &s.user != user);
        let evicted = before - subscribers.len();
        if subscribers.is_empty() {
            groups.remove(group);
        }
        evicted
    }

    /// Forget a group entirely
    pub fn close_group(&self, group: &GroupId) {
        self.groups
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(group);
    }

    /// Snapshot of the handles subscribed to `group`
    pub fn handles(&self, group: &GroupId) -> Vec<ConnectionHandle> {
        self.groups
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(group)
            .map(|subscribers| subscribers.values().map(|s| s.handle.clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, group: &GroupId, connection: ConnectionId) -> bool {
        self.groups
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(group)
            .is_some_and(|subscribers| subscribers.contains_key(&connection))
    }

    pub fn subscriber_count(&self, group: &GroupId) -> usize {
        self.groups
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(group)
            .map_or(0, HashMap::len)
    }

    /// Send `event` to every subscriber of `group`; returns how many took it
    pub fn broadcast(&self, group: &GroupId, event: &ServerEvent) -> usize {
        // clone handles out so the lock is not held while sending
        let handles = self.handles(group);
        let delivered = handles.iter().filter(|h| h.send(event.clone())).count();
        tracing::debug!(
            "[Realtime] Group {} event delivered to {}/{} subscribers",
            group,
            delivered,
            handles.len()
        );
        delivered
    }
}
