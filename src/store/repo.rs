use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::{NewNotification, NewTask, TaskUpdate};
use super::repo_types::{CompletedPayment, Notification, Task};

/// Per-user portal state. Every key is owned by exactly one user id; last write wins.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns false when the reference was already recorded for this user.
    async fn record_completed_payment(&self, user_id: &str, merchant_trans_id: &str) -> anyhow::Result<bool>;
    async fn completed_payments(&self, user_id: &str) -> anyhow::Result<Vec<CompletedPayment>>;

    async fn push_notification(&self, user_id: &str, new: NewNotification) -> anyhow::Result<Notification>;
    async fn notifications(&self, user_id: &str) -> anyhow::Result<Vec<Notification>>;
    async fn mark_notification_read(&self, user_id: &str, id: Uuid) -> anyhow::Result<bool>;
    async fn mark_all_notifications_read(&self, user_id: &str) -> anyhow::Result<u64>;

    async fn add_task(&self, user_id: &str, new: NewTask) -> anyhow::Result<Task>;
    async fn tasks(&self, user_id: &str) -> anyhow::Result<Vec<Task>>;
    async fn update_task(&self, user_id: &str, id: Uuid, update: TaskUpdate) -> anyhow::Result<Option<Task>>;
    async fn delete_task(&self, user_id: &str, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgStateStore {
    db: PgPool,
}

impl PgStateStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StateStore for PgStateStore {
    async fn record_completed_payment(&self, user_id: &str, merchant_trans_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO completed_payments (user_id, merchant_trans_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, merchant_trans_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(merchant_trans_id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn completed_payments(&self, user_id: &str) -> anyhow::Result<Vec<CompletedPayment>> {
        let rows = sqlx::query_as::<_, CompletedPayment>(
            r#"
            SELECT merchant_trans_id, completed_at
            FROM completed_payments
            WHERE user_id = $1
            ORDER BY completed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn push_notification(&self, user_id: &str, new: NewNotification) -> anyhow::Result<Notification> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, kind, message, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, kind, message, link, is_read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.kind.as_str())
        .bind(new.message)
        .bind(new.link)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn notifications(&self, user_id: &str) -> anyhow::Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, message, link, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn mark_notification_read(&self, user_id: &str, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE"#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn add_task(&self, user_id: &str, new: NewTask) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, user_id, description, due_date, article_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, description, due_date, is_completed, article_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.description)
        .bind(new.due_date)
        .bind(new.article_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn tasks(&self, user_id: &str) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, description, due_date, is_completed, article_id, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY due_date, created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_task(&self, user_id: &str, id: Uuid, update: TaskUpdate) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                is_completed = COALESCE($5, is_completed)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, description, due_date, is_completed, article_id, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(update.description)
        .bind(update.due_date)
        .bind(update.is_completed)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete_task(&self, user_id: &str, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM tasks WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
pub use memory::MemoryStateStore;
