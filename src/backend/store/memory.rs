/**
 * In-Memory Store
 *
 * Keeps every table in one struct behind a single `tokio::sync::RwLock`, so
 * each trait call is atomic with respect to the others. Vectors are used for
 * groups and messages so iteration order is insertion order.
 *
 * Used when `DATABASE_URL` is not set and throughout the test-suite.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewGroup, Store, StoreError, StoreResult};
use crate::backend::auth::users::{normalize_email, NewUser, ProfileUpdate, User};
use crate::backend::authorization::RelationshipSnapshot;
use crate::shared::messaging::{
    DirectMessage, Group, GroupId, GroupMessage, Membership, MessageId, UpdateGroupRequest, UserId,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    relationships: HashMap<UserId, RelationshipSnapshot>,
    groups: Vec<Group>,
    direct_messages: Vec<DirectMessage>,
    group_messages: Vec<GroupMessage>,
}

impl Tables {
    fn relationship_mut(&mut self, user: UserId) -> &mut RelationshipSnapshot {
        self.relationships.entry(user).or_default()
    }

    fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }
}

/// Store kept entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn push_unique(list: &mut Vec<UserId>, user: UserId) {
    if !list.contains(&user) {
        list.push(user);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = normalize_email(&user.email);
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::Duplicate("email"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name.trim().to_string(),
            email,
            password_hash: user.password_hash,
            bio: String::new(),
            avatar_url: String::new(),
            location: String::new(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn list_users_except(&self, id: UserId) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().filter(|u| u.id != id).cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(users)
    }

    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            update.apply(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn relationships(&self, user: UserId) -> StoreResult<RelationshipSnapshot> {
        Ok(self
            .tables
            .read()
            .await
            .relationships
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_request(&self, from: UserId, to: UserId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.relationship_mut(from).requests_sent.insert(to);
        tables.relationship_mut(to).requests_received.insert(from);
        Ok(())
    }

    async fn accept_request(&self, me: UserId, from: UserId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        {
            let mine = tables.relationship_mut(me);
            mine.requests_received.remove(&from);
            mine.requests_sent.remove(&from);
            mine.friends.insert(from);
        }
        let theirs = tables.relationship_mut(from);
        theirs.requests_sent.remove(&me);
        theirs.requests_received.remove(&me);
        theirs.friends.insert(me);
        Ok(())
    }

    async fn clear_request(&self, me: UserId, from: UserId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.relationship_mut(me).requests_received.remove(&from);
        tables.relationship_mut(from).requests_sent.remove(&me);
        Ok(())
    }

    async fn create_group(&self, group: NewGroup) -> StoreResult<Group> {
        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: group.name,
            description: group.description,
            logo_url: group.logo_url,
            admin: group.admin,
            members: vec![group.admin],
            pending_members: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.groups.push(group.clone());
        Ok(group)
    }

    async fn group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        Ok(self.tables.read().await.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        Ok(self.tables.read().await.groups.clone())
    }

    async fn update_group(&self, id: GroupId, update: &UpdateGroupRequest) -> StoreResult<Option<Group>> {
        let mut tables = self.tables.write().await;
        Ok(tables.group_mut(id).map(|group| {
            if let Some(name) = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                group.name = name.to_string();
            }
            if let Some(description) = &update.description {
                group.description = description.trim().to_string();
            }
            if let Some(logo_url) = &update.logo_url {
                group.logo_url = logo_url.trim().to_string();
            }
            group.updated_at = Utc::now();
            group.clone()
        }))
    }

    async fn delete_group(&self, id: GroupId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.groups.len();
        tables.groups.retain(|g| g.id != id);
        if tables.groups.len() == before {
            return Ok(false);
        }
        tables.group_messages.retain(|m| m.group != id);
        Ok(true)
    }

    async fn set_membership(&self, group: GroupId, user: UserId, state: Membership) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let Some(group) = tables.group_mut(group) else {
            return Ok(());
        };
        match state {
            Membership::Member => {
                group.pending_members.retain(|u| *u != user);
                push_unique(&mut group.members, user);
            }
            Membership::Pending => {
                if group.admin != user && !group.members.contains(&user) {
                    push_unique(&mut group.pending_members, user);
                }
            }
            Membership::Removed => {
                group.members.retain(|u| *u != user);
                group.pending_members.retain(|u| *u != user);
            }
        }
        group.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_direct_message(&self, from: UserId, to: UserId, content: &str) -> StoreResult<DirectMessage> {
        let message = DirectMessage {
            id: Uuid::new_v4(),
            from,
            to,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.direct_messages.push(message.clone());
        Ok(message)
    }

    async fn conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<DirectMessage>> {
        Ok(self
            .tables
            .read()
            .await
            .direct_messages
            .iter()
            .filter(|m| (m.from == a && m.to == b) || (m.from == b && m.to == a))
            .cloned()
            .collect())
    }

    async fn delete_conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<MessageId>> {
        let mut tables = self.tables.write().await;
        let mut deleted = Vec::new();
        tables.direct_messages.retain(|m| {
            let hit = (m.from == a && m.to == b) || (m.from == b && m.to == a);
            if hit {
                deleted.push(m.id);
            }
            !hit
        });
        Ok(deleted)
    }

    async fn direct_message(&self, id: MessageId) -> StoreResult<Option<DirectMessage>> {
        Ok(self
            .tables
            .read()
            .await
            .direct_messages
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn delete_direct_message(&self, id: MessageId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.direct_messages.len();
        tables.direct_messages.retain(|m| m.id != id);
        Ok(tables.direct_messages.len() != before)
    }

    async fn insert_group_message(&self, group: GroupId, sender: UserId, content: &str) -> StoreResult<GroupMessage> {
        let message = GroupMessage {
            id: Uuid::new_v4(),
            group,
            sender,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.group_messages.push(message.clone());
        Ok(message)
    }

    async fn group_messages(&self, group: GroupId) -> StoreResult<Vec<GroupMessage>> {
        Ok(self
            .tables
            .read()
            .await
            .group_messages
            .iter()
            .filter(|m| m.group == group)
            .cloned()
            .collect())
    }

    async fn group_message(&self, id: MessageId) -> StoreResult<Option<GroupMessage>> {
        Ok(self
            .tables
            .read()
            .await
            .group_messages
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn delete_group_message(&self, id: MessageId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.group_messages.len();
        tables.group_messages.retain(|m| m.id != id);
        Ok(tables.group_messages.len() != before)
    }
}
