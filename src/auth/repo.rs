use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::auth::repo_types::Session;
use crate::backend::dto::User;

/// Owner of portal sessions and the backend tokens inside them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, access: &str, refresh: &str, user: &User) -> anyhow::Result<Session>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Session>>;
    async fn update_access_token(&self, id: Uuid, access: &str) -> anyhow::Result<()>;
    async fn update_user(&self, id: Uuid, user: &User) -> anyhow::Result<()>;
    /// Drop both backend tokens and the cached user.
    async fn clear(&self, id: Uuid) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, access: &str, refresh: &str, user: &User) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO portal_sessions (id, access_token, refresh_token, user_data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, access_token, refresh_token, user_data, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(access)
        .bind(refresh)
        .bind(Json(user))
        .fetch_one(&self.db)
        .await?;
        Ok(session)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, access_token, refresh_token, user_data, created_at
            FROM portal_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(session)
    }

    async fn update_access_token(&self, id: Uuid, access: &str) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE portal_sessions SET access_token = $2, updated_at = now() WHERE id = $1"#)
            .bind(id)
            .bind(access)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_user(&self, id: Uuid, user: &User) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE portal_sessions SET user_data = $2, updated_at = now() WHERE id = $1"#)
            .bind(id)
            .bind(Json(user))
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM portal_sessions WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemorySessionStore;
