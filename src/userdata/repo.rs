use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A row of the per-user data collection. The payload schema is owned by
/// whatever writes it; this service only scopes reads to the owner.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DataRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payload: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl DataRecord {
    pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<DataRecord>> {
        let rows = sqlx::query_as::<_, DataRecord>(
            r#"
            SELECT id, user_id, payload, created_at
            FROM user_data
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
