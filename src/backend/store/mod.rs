//! Store Module
//!
//! Persistence for users, relationships, groups and messages behind one
//! object-safe trait. Handlers and the fan-out engine hold an
//! `Arc<dyn Store>` and never see which backend is in use.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs       - Store trait and error type
//! ├── memory.rs    - In-process backend (tests, no DATABASE_URL)
//! └── postgres.rs  - PostgreSQL backend via sqlx
//! ```
//!
//! # Ordering
//!
//! Histories (`conversation`, `group_messages`) are returned in ascending
//! creation order. Ties keep insertion order.

use async_trait::async_trait;
use thiserror::Error;

use crate::backend::auth::users::{NewUser, ProfileUpdate, User};
use crate::backend::authorization::RelationshipSnapshot;
use crate::shared::messaging::{
    DirectMessage, Group, GroupId, GroupMessage, Membership, MessageId, UpdateGroupRequest, UserId,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint violated (e.g. email already registered)
    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a new group. The admin becomes the first member.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub admin: UserId,
}

/// Persistence used by every surface of the server
#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Insert a user; `Duplicate("email")` when the email is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
    /// Lookup by normalized email
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Users for the given ids; missing ids are skipped
    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;
    /// Every user except `id`, ordered by name
    async fn list_users_except(&self, id: UserId) -> StoreResult<Vec<User>>;
    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> StoreResult<Option<User>>;

    // Relationships

    /// Friend and request sets of one user
    async fn relationships(&self, user: UserId) -> StoreResult<RelationshipSnapshot>;
    /// `from` asks `to`; idempotent
    async fn record_request(&self, from: UserId, to: UserId) -> StoreResult<()>;
    /// `me` accepts `from`: clears requests both ways and befriends both
    async fn accept_request(&self, me: UserId, from: UserId) -> StoreResult<()>;
    /// `me` ignores `from`: clears the request without befriending
    async fn clear_request(&self, me: UserId, from: UserId) -> StoreResult<()>;

    // Groups

    async fn create_group(&self, group: NewGroup) -> StoreResult<Group>;
    async fn group(&self, id: GroupId) -> StoreResult<Option<Group>>;
    /// All groups, oldest first
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;
    /// Apply an admin edit; a blank name is ignored
    async fn update_group(&self, id: GroupId, update: &UpdateGroupRequest) -> StoreResult<Option<Group>>;
    /// Delete the group and all of its messages; false when absent
    async fn delete_group(&self, id: GroupId) -> StoreResult<bool>;
    /// Move `user` into the given membership state
    async fn set_membership(&self, group: GroupId, user: UserId, state: Membership) -> StoreResult<()>;

    // Direct messages

    async fn insert_direct_message(&self, from: UserId, to: UserId, content: &str) -> StoreResult<DirectMessage>;
    /// Messages between `a` and `b` in both directions, ascending
    async fn conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<DirectMessage>>;
    /// Delete the conversation; returns the deleted ids
    async fn delete_conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<MessageId>>;
    async fn direct_message(&self, id: MessageId) -> StoreResult<Option<DirectMessage>>;
    async fn delete_direct_message(&self, id: MessageId) -> StoreResult<bool>;

    // Group messages

    async fn insert_group_message(&self, group: GroupId, sender: UserId, content: &str) -> StoreResult<GroupMessage>;
    /// Messages of one group, ascending
    async fn group_messages(&self, group: GroupId) -> StoreResult<Vec<GroupMessage>>;
    async fn group_message(&self, id: MessageId) -> StoreResult<Option<GroupMessage>>;
    async fn delete_group_message(&self, id: MessageId) -> StoreResult<bool>;
}
