use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Task record. `user_id` is the owning identity; every query below other
/// than `create` takes it as a mandatory filter, never as an after-the-fact
/// check on a fetched row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task: String,
    pub created_at: OffsetDateTime,
}

impl Task {
    pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, task, created_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Fetch by id and owner in one compound filter. A task owned by
    /// someone else is indistinguishable from one that does not exist.
    pub async fn find_owned(
        db: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, task, created_at
            FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(db: &PgPool, user_id: Uuid, text: &str) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO todos (user_id, task)
            VALUES ($1, $2)
            RETURNING id, user_id, task, created_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Returns the affected-row count; 0 means not found (or not owned).
    pub async fn update_owned(
        db: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE todos SET task = $3
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(text)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Returns the affected-row count; 0 means not found (or not owned).
    pub async fn delete_owned(db: &PgPool, task_id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Cascade step of account deletion.
    pub async fn delete_all_by_owner(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM todos WHERE user_id = $1"#)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
