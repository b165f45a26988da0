//! PostgreSQL Store
//!
//! `Store` over a `sqlx::PgPool`. Schema lives in `migrations/` and is applied
//! by [`PgStore::connect`]. Multi-row mutations run in a transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{NewGroup, Store, StoreError, StoreResult};
use crate::backend::auth::users::{normalize_email, NewUser, ProfileUpdate, User};
use crate::backend::authorization::RelationshipSnapshot;
use crate::shared::messaging::{
    DirectMessage, Group, GroupId, GroupMessage, Membership, MessageId, UpdateGroupRequest, UserId,
};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, bio, avatar_url, location, created_at, updated_at";

/// Store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("Database connection pool created successfully");

        tracing::info!("Running database migrations...");
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Database migrations completed successfully");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Load one group (`Some(id)`) or all groups (`None`) with their member lists
    async fn load_groups(&self, id: Option<GroupId>) -> StoreResult<Vec<Group>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, logo_url, admin_id, created_at, updated_at
            FROM groups
            WHERE ($1::uuid IS NULL OR id = $1)
            ORDER BY created_at, id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut groups: Vec<Group> = rows
            .into_iter()
            .map(|row| Group {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                logo_url: row.get("logo_url"),
                admin: row.get("admin_id"),
                members: Vec::new(),
                pending_members: Vec::new(),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect();
        if groups.is_empty() {
            return Ok(groups);
        }

        let index: HashMap<GroupId, usize> = groups.iter().enumerate().map(|(i, g)| (g.id, i)).collect();
        let members = sqlx::query(
            r#"
            SELECT group_id, user_id, status
            FROM group_members
            WHERE ($1::uuid IS NULL OR group_id = $1)
            ORDER BY joined_at, seq
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        for row in members {
            let group_id: GroupId = row.get("group_id");
            let Some(&i) = index.get(&group_id) else {
                continue;
            };
            let user: UserId = row.get("user_id");
            match row.get::<String, _>("status").as_str() {
                "member" => groups[i].members.push(user),
                _ => groups[i].pending_members.push(user),
            }
        }
        Ok(groups)
    }

    async fn touch_group(&self, id: GroupId) -> StoreResult<()> {
        sqlx::query("UPDATE groups SET updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn direct_message_from_row(row: &sqlx::postgres::PgRow) -> DirectMessage {
    DirectMessage {
        id: row.get("id"),
        from: row.get("from_id"),
        to: row.get("to_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

fn group_message_from_row(row: &sqlx::postgres::PgRow) -> GroupMessage {
    GroupMessage {
        id: row.get("id"),
        group: row.get("group_id"),
        sender: row.get("sender_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

fn map_unique(err: sqlx::Error, what: &'static str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Duplicate(what);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(user.name.trim())
            .bind(normalize_email(&user.email))
            .bind(&user.password_hash)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "email"))
    }

    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let mut found: HashMap<UserId, User> = sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        // keep the caller's order
        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    async fn list_users_except(&self, id: UserId) -> StoreResult<Vec<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE id <> $1 ORDER BY name, created_at",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> StoreResult<Option<User>> {
        let Some(mut user) = self.user_by_id(id).await? else {
            return Ok(None);
        };
        update.apply(&mut user);
        user.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE users
            SET name = $1, bio = $2, avatar_url = $3, location = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(&user.location)
        .bind(user.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(user))
    }

    async fn relationships(&self, user: UserId) -> StoreResult<RelationshipSnapshot> {
        let rows = sqlx::query("SELECT other_id, kind FROM relationships WHERE user_id = $1")
            .bind(user)
            .fetch_all(&self.pool)
            .await?;

        let mut snapshot = RelationshipSnapshot::default();
        for row in rows {
            let other: UserId = row.get("other_id");
            match row.get::<String, _>("kind").as_str() {
                "friend" => snapshot.friends.insert(other),
                "sent" => snapshot.requests_sent.insert(other),
                _ => snapshot.requests_received.insert(other),
            };
        }
        Ok(snapshot)
    }

    async fn record_request(&self, from: UserId, to: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for (user, other, kind) in [(from, to, "sent"), (to, from, "received")] {
            sqlx::query(
                r#"
                INSERT INTO relationships (user_id, other_id, kind, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, other_id) DO NOTHING
                "#,
            )
            .bind(user)
            .bind(other)
            .bind(kind)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn accept_request(&self, me: UserId, from: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for (user, other) in [(me, from), (from, me)] {
            sqlx::query(
                r#"
                INSERT INTO relationships (user_id, other_id, kind, created_at)
                VALUES ($1, $2, 'friend', $3)
                ON CONFLICT (user_id, other_id) DO UPDATE SET kind = 'friend'
                "#,
            )
            .bind(user)
            .bind(other)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear_request(&self, me: UserId, from: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for (user, other, kind) in [(me, from, "received"), (from, me, "sent")] {
            sqlx::query("DELETE FROM relationships WHERE user_id = $1 AND other_id = $2 AND kind = $3")
                .bind(user)
                .bind(other)
                .bind(kind)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn create_group(&self, group: NewGroup) -> StoreResult<Group> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO groups (id, name, description, logo_url, admin_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(&group.logo_url)
        .bind(group.admin)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, status, joined_at) VALUES ($1, $2, 'member', $3)",
        )
        .bind(id)
        .bind(group.admin)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Group {
            id,
            name: group.name,
            description: group.description,
            logo_url: group.logo_url,
            admin: group.admin,
            members: vec![group.admin],
            pending_members: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        Ok(self.load_groups(Some(id)).await?.into_iter().next())
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        self.load_groups(None).await
    }

    async fn update_group(&self, id: GroupId, update: &UpdateGroupRequest) -> StoreResult<Option<Group>> {
        let name = update
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let description = update.description.as_deref().map(str::trim);
        let logo_url = update.logo_url.as_deref().map(str::trim);

        let result = sqlx::query(
            r#"
            UPDATE groups
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                logo_url = COALESCE($3, logo_url),
                updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(logo_url)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.group(id).await
    }

    async fn delete_group(&self, id: GroupId) -> StoreResult<bool> {
        // members and messages go with the group (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_membership(&self, group: GroupId, user: UserId, state: Membership) -> StoreResult<()> {
        let now = Utc::now();
        match state {
            Membership::Member => {
                sqlx::query(
                    r#"
                    INSERT INTO group_members (group_id, user_id, status, joined_at)
                    VALUES ($1, $2, 'member', $3)
                    ON CONFLICT (group_id, user_id)
                    DO UPDATE SET status = 'member', joined_at = EXCLUDED.joined_at
                    WHERE group_members.status <> 'member'
                    "#,
                )
                .bind(group)
                .bind(user)
                .bind(now)
                .execute(&self.pool)
                .await?;
            }
            Membership::Pending => {
                sqlx::query(
                    r#"
                    INSERT INTO group_members (group_id, user_id, status, joined_at)
                    SELECT $1, $2, 'pending', $3
                    WHERE NOT EXISTS (SELECT 1 FROM groups WHERE id = $1 AND admin_id = $2)
                    ON CONFLICT (group_id, user_id) DO NOTHING
                    "#,
                )
                .bind(group)
                .bind(user)
                .bind(now)
                .execute(&self.pool)
                .await?;
            }
            Membership::Removed => {
                sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
                    .bind(group)
                    .bind(user)
                    .execute(&self.pool)
                    .await?;
            }
        }
        self.touch_group(group).await
    }

    async fn insert_direct_message(&self, from: UserId, to: UserId, content: &str) -> StoreResult<DirectMessage> {
        let message = DirectMessage {
            id: Uuid::new_v4(),
            from,
            to,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO direct_messages (id, from_id, to_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.from)
        .bind(message.to)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(message)
    }

    async fn conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<DirectMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, from_id, to_id, content, created_at
            FROM direct_messages
            WHERE (from_id = $1 AND to_id = $2) OR (from_id = $2 AND to_id = $1)
            ORDER BY created_at, seq
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(direct_message_from_row).collect())
    }

    async fn delete_conversation(&self, a: UserId, b: UserId) -> StoreResult<Vec<MessageId>> {
        let rows = sqlx::query(
            r#"
            DELETE FROM direct_messages
            WHERE (from_id = $1 AND to_id = $2) OR (from_id = $2 AND to_id = $1)
            RETURNING id
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    async fn direct_message(&self, id: MessageId) -> StoreResult<Option<DirectMessage>> {
        let row = sqlx::query("SELECT id, from_id, to_id, content, created_at FROM direct_messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(direct_message_from_row))
    }

    async fn delete_direct_message(&self, id: MessageId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM direct_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_group_message(&self, group: GroupId, sender: UserId, content: &str) -> StoreResult<GroupMessage> {
        let message = GroupMessage {
            id: Uuid::new_v4(),
            group,
            sender,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO group_messages (id, group_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.group)
        .bind(message.sender)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(message)
    }

    async fn group_messages(&self, group: GroupId) -> StoreResult<Vec<GroupMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, group_id, sender_id, content, created_at
            FROM group_messages
            WHERE group_id = $1
            ORDER BY created_at, seq
            "#,
        )
        .bind(group)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(group_message_from_row).collect())
    }

    async fn group_message(&self, id: MessageId) -> StoreResult<Option<GroupMessage>> {
        let row = sqlx::query("SELECT id, group_id, sender_id, content, created_at FROM group_messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(group_message_from_row))
    }

    async fn delete_group_message(&self, id: MessageId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM group_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
