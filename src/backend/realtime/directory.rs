/**
 * Connection Directory
 *
 * Process-wide map from identity to the single live connection registered
 * for it. A new registration replaces the previous one (last registered
 * wins) without closing it; the replaced socket keeps working for anything
 * it is already subscribed to but no longer receives direct messages.
 *
 * Removal is compare-and-remove on the connection id, so a stale socket
 * closing late cannot evict the newer registration.
 *
 * The map sits behind `std::sync::RwLock`. No method awaits while holding it.
 */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::shared::messaging::UserId;
use crate::shared::ServerEvent;

/// Identity of one open socket
pub type ConnectionId = Uuid;

/// Sending half of one open socket
///
/// Cloning shares the same underlying channel. Delivery is best effort: a
/// full or closed channel drops the event.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    /// New handle and the receiver its writer task drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an event for this socket; false when it was dropped
    pub fn send(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("[Realtime] Connection {} buffer full, dropping event", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("[Realtime] Connection {} closed, dropping event", self.id);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// `UserId -> ConnectionHandle`, at most one entry per identity
#[derive(Debug, Clone, Default)]
pub struct ConnectionDirectory {
    entries: Arc<RwLock<HashMap<UserId, ConnectionHandle>>>,
}

impl ConnectionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `user` to `handle`, returning the handle it replaced
    pub fn register(&self, user: UserId, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let previous = entries.insert(user, handle);
        if let Some(prev) = &previous {
            tracing::debug!("[Realtime] User {} re-registered, replacing connection {}", user, prev.id());
        }
        previous
    }

    pub fn lookup(&self, user: &UserId) -> Option<ConnectionHandle> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(user)
            .cloned()
    }

    /// Remove `user` only if still mapped to connection `id`
    pub fn unregister(&self, user: &UserId, id: ConnectionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.get(user) {
            Some(current) if current.id() == id => {
                entries.remove(user);
                true
            }
            _ => false,
        }
    }

    pub fn is_online(&self, user: &UserId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(user)
    }

    pub fn online_count(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Drop entries whose socket has gone away; returns how many
    pub fn prune_closed(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, handle| !handle.is_closed());
        before - entries.len()
    }
}
