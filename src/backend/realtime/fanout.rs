/**
 * Real-Time Fan-Out Engine
 *
 * Turns inbound socket events into persisted messages and outbound copies.
 * Every event runs strictly in this order:
 *
 * 1. validate the payload and the sender identity
 * 2. authorize through `backend::authorization`
 * 3. persist through the `Store`
 * 4. fan out to the connection directory or a group's broadcast scope
 *
 * Nothing is delivered when an earlier step fails. Failures are reported to
 * the originating connection as a `rejected` event; store failures are also
 * logged.
 *
 * HTTP handlers use the `notify_*` methods so deletions and membership
 * changes reach live sockets too.
 */

use std::sync::Arc;

use thiserror::Error;

use super::directory::{ConnectionDirectory, ConnectionHandle};
use super::scope::BroadcastScope;
use crate::backend::authorization::{self, DenyReason, GroupSnapshot};
use crate::backend::store::{Store, StoreError};
use crate::shared::error::require_text;
use crate::shared::event::{
    AnnounceIdentity, GroupChannel, MessageDeleted, SendDirectMessage, SendGroupMessage,
};
use crate::shared::messaging::{GroupId, MessageId, UserId};
use crate::shared::{ClientEvent, ServerEvent, SharedError};

/// Default capacity of each connection's outbound queue
pub const DEFAULT_CONNECTION_BUFFER: usize = 256;

/// Behaviour switches for the engine
#[derive(Debug, Clone, Copy)]
pub struct FanOutPolicy {
    /// Refuse direct messages between users who are not friends
    pub require_friendship: bool,
    /// Outbound queue capacity per socket
    pub connection_buffer: usize,
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self {
            require_friendship: false,
            connection_buffer: DEFAULT_CONNECTION_BUFFER,
        }
    }
}

/// Why an inbound event was not carried out
#[derive(Debug, Error)]
pub enum FanOutError {
    #[error("Announce an identity first")]
    NotAnnounced,

    #[error("Sender does not match the announced identity")]
    IdentityMismatch,

    #[error("Connection is not authorized for this identity")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Denied(#[from] DenyReason),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FanOutError {
    /// Reason code sent in the `rejected` event
    pub fn reason(&self) -> &'static str {
        match self {
            FanOutError::NotAnnounced => "not_announced",
            FanOutError::IdentityMismatch => "identity_mismatch",
            FanOutError::Unauthorized => "unauthorized",
            FanOutError::Validation(_) => "validation",
            FanOutError::NotFound(_) => "not_found",
            FanOutError::Denied(reason) => reason.code(),
            FanOutError::Store(_) => "internal",
        }
    }

    /// Client-facing text; store details stay in the log
    pub fn client_message(&self) -> String {
        match self {
            FanOutError::Store(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Per-socket state owned by the socket's reader loop
///
/// `principal` is the user whose token opened the socket; `identity` is set
/// once that same user has been announced.
#[derive(Debug)]
pub struct Session {
    handle: ConnectionHandle,
    principal: UserId,
    identity: Option<UserId>,
}

impl Session {
    pub fn new(handle: ConnectionHandle, principal: UserId) -> Self {
        Self {
            handle,
            principal,
            identity: None,
        }
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn identity(&self) -> Option<UserId> {
        self.identity
    }

    fn require_identity(&self) -> Result<UserId, FanOutError> {
        self.identity.ok_or(FanOutError::NotAnnounced)
    }

    /// The announced identity, which must equal the payload's sender
    fn require_sender(&self, from: UserId) -> Result<UserId, FanOutError> {
        let identity = self.require_identity()?;
        if identity != from {
            return Err(FanOutError::IdentityMismatch);
        }
        Ok(identity)
    }
}

/// The engine shared by every socket and by the HTTP handlers
#[derive(Clone)]
pub struct FanOut {
    store: Arc<dyn Store>,
    directory: ConnectionDirectory,
    scope: BroadcastScope,
    policy: FanOutPolicy,
}

impl FanOut {
    pub fn new(
        store: Arc<dyn Store>,
        directory: ConnectionDirectory,
        scope: BroadcastScope,
        policy: FanOutPolicy,
    ) -> Self {
        Self {
            store,
            directory,
            scope,
            policy,
        }
    }

    pub fn directory(&self) -> &ConnectionDirectory {
        &self.directory
    }

    pub fn scope(&self) -> &BroadcastScope {
        &self.scope
    }

    pub fn policy(&self) -> FanOutPolicy {
        self.policy
    }

    /// Handle plus receiver for a newly accepted socket
    pub fn open_connection(&self) -> (ConnectionHandle, tokio::sync::mpsc::Receiver<ServerEvent>) {
        ConnectionHandle::channel(self.policy.connection_buffer)
    }

    /// Decode and process one text frame
    pub async fn dispatch(&self, session: &mut Session, text: &str) {
        match ClientEvent::parse(text) {
            Ok(event) => self.handle_event(session, event).await,
            Err(e) => {
                tracing::debug!("[Realtime] Malformed frame from {}: {}", session.handle.id(), e);
                session
                    .handle
                    .send(ServerEvent::rejected("unknown", "validation", e.to_string()));
            }
        }
    }

    /// Process one decoded event, replying with `rejected` on failure
    pub async fn handle_event(&self, session: &mut Session, event: ClientEvent) {
        let name = event.name();
        let result = match event {
            ClientEvent::AnnounceIdentity(payload) => self.announce(session, payload).await,
            ClientEvent::SendDirectMessage(payload) => self.send_direct(session, payload).await,
            ClientEvent::SubscribeGroupChannel(payload) => self.subscribe_group(session, payload).await,
            ClientEvent::UnsubscribeGroupChannel(payload) => {
                self.unsubscribe_group(session, payload);
                Ok(())
            }
            ClientEvent::SendGroupMessage(payload) => self.send_group(session, payload).await,
        };

        if let Err(err) = result {
            match &err {
                FanOutError::Store(e) => {
                    tracing::error!("[Realtime] {} failed for {}: {}", name, session.handle.id(), e)
                }
                other => tracing::debug!("[Realtime] {} rejected: {}", name, other),
            }
            session
                .handle
                .send(ServerEvent::rejected(name, err.reason(), err.client_message()));
        }
    }

    /// Bind the socket to its authenticated user and register it in the
    /// directory. Announcing anyone else is refused.
    pub async fn announce(&self, session: &mut Session, payload: AnnounceIdentity) -> Result<(), FanOutError> {
        let user = payload.user_id;
        if user != session.principal {
            tracing::warn!(
                "[Realtime] Connection {} of {} tried to announce as {}",
                session.handle.id(),
                session.principal,
                user
            );
            return Err(FanOutError::Unauthorized);
        }
        if self.store.user_by_id(user).await?.is_none() {
            return Err(FanOutError::NotFound("User"));
        }

        session.identity = Some(user);
        self.directory.register(user, session.handle.clone());
        tracing::info!("[Realtime] User {} online on connection {}", user, session.handle.id());

        session
            .handle
            .send(ServerEvent::IdentityAnnounced(AnnounceIdentity { user_id: user }));
        Ok(())
    }

    /// Persist a direct message, deliver it to the recipient if online and
    /// echo it to the sending connection
    pub async fn send_direct(&self, session: &Session, payload: SendDirectMessage) -> Result<(), FanOutError> {
        let from = session.require_sender(payload.from)?;
        let content = require_text("content", &payload.content)?;
        if self.store.user_by_id(payload.to).await?.is_none() {
            return Err(FanOutError::NotFound("Recipient"));
        }

        if self.policy.require_friendship {
            let relationships = self.store.relationships(from).await?;
            authorization::can_exchange_direct_message(&relationships, &payload.to)?;
        }

        let message = self.store.insert_direct_message(from, payload.to, &content).await?;
        let event = ServerEvent::DirectMessageDelivered(message);

        if let Some(recipient) = self.directory.lookup(&payload.to) {
            if recipient.id() != session.handle.id() {
                recipient.send(event.clone());
            }
        }
        session.handle.send(event);
        Ok(())
    }

    /// Admit the socket to a group's broadcast scope
    pub async fn subscribe_group(&self, session: &Session, payload: GroupChannel) -> Result<(), FanOutError> {
        let user = session.require_identity()?;
        let snapshot = self.group_snapshot(payload.group_id).await?;
        authorization::can_read_group(&snapshot, &user)?;

        self.admit(session, user, payload.group_id).await?;
        tracing::debug!("[Realtime] {} subscribed to group {}", user, payload.group_id);
        session.handle.send(ServerEvent::GroupChannelSubscribed(payload));
        Ok(())
    }

    /// Insert into the scope, then confirm membership against a fresh read.
    ///
    /// A removal whose eviction ran between the first check and the insert
    /// would otherwise be undone; the second read sees its store update.
    async fn admit(&self, session: &Session, user: UserId, group: GroupId) -> Result<(), FanOutError> {
        self.scope.subscribe(group, user, session.handle.clone());
        let recheck = match self.group_snapshot(group).await {
            Ok(snapshot) => authorization::can_read_group(&snapshot, &user).map_err(FanOutError::from),
            Err(e) => Err(e),
        };
        if recheck.is_err() {
            self.scope.unsubscribe(&group, session.handle.id());
        }
        recheck
    }

    pub fn unsubscribe_group(&self, session: &Session, payload: GroupChannel) {
        self.scope.unsubscribe(&payload.group_id, session.handle.id());
    }

    /// Persist a group message and broadcast it to the group's scope
    pub async fn send_group(&self, session: &Session, payload: SendGroupMessage) -> Result<(), FanOutError> {
        let sender = session.require_sender(payload.from)?;
        let content = require_text("content", &payload.content)?;
        let snapshot = self.group_snapshot(payload.group_id).await?;
        authorization::can_read_group(&snapshot, &sender)?;

        let message = self
            .store
            .insert_group_message(payload.group_id, sender, &content)
            .await?;
        tracing::debug!("[Realtime] Group message {} persisted in {}", message.id, message.group);
        self.scope
            .broadcast(&payload.group_id, &ServerEvent::GroupMessageDelivered(message));
        Ok(())
    }

    /// Release everything a closing socket holds
    pub fn disconnect(&self, session: &Session) {
        let id = session.handle.id();
        if let Some(user) = session.identity {
            if self.directory.unregister(&user, id) {
                tracing::info!("[Realtime] User {} offline", user);
            }
        }
        self.scope.remove_connection(id);
    }

    /// Tell both parties' live connections that direct messages are gone
    pub fn notify_direct_deleted(&self, a: UserId, b: UserId, ids: &[MessageId]) {
        if ids.is_empty() {
            return;
        }
        let parties = if a == b { vec![a] } else { vec![a, b] };
        for user in parties {
            if let Some(handle) = self.directory.lookup(&user) {
                for id in ids {
                    handle.send(ServerEvent::MessageDeleted(MessageDeleted { id: *id, group: None }));
                }
            }
        }
    }

    /// Tell a group's subscribers that one of its messages is gone
    pub fn notify_group_message_deleted(&self, group: GroupId, id: MessageId) {
        self.scope.broadcast(
            &group,
            &ServerEvent::MessageDeleted(MessageDeleted {
                id,
                group: Some(group),
            }),
        );
    }

    /// A user left or was removed from a group
    pub fn notify_member_removed(&self, group: GroupId, user: UserId) {
        let evicted = self.scope.evict_user(&group, &user);
        if evicted > 0 {
            tracing::debug!("[Realtime] Evicted {} connection(s) of {} from group {}", evicted, user, group);
        }
    }

    /// A group was deleted
    pub fn notify_group_deleted(&self, group: GroupId) {
        self.scope.close_group(&group);
    }

    async fn group_snapshot(&self, group: GroupId) -> Result<GroupSnapshot, FanOutError> {
        self.store
            .group(group)
            .await?
            .map(|g| GroupSnapshot::from(&g))
            .ok_or(FanOutError::NotFound("Group"))
    }
}
