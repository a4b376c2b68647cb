use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Identity bound to a session: a copy of the user's id and display name
/// taken at login time, not a live reference to the user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: Uuid,
    pub name: String,
}

/// Server-side session record, keyed by the opaque token the client holds
/// as a cookie. A token with no row here is anonymous.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Bind a fresh session to a user identity. A new opaque token is
    /// issued on every login/registration; whatever token the client held
    /// before simply stops resolving.
    pub async fn create(
        db: &PgPool,
        user: &UserSnapshot,
        ttl_minutes: i64,
    ) -> anyhow::Result<Session> {
        let token = Uuid::new_v4();
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, user_name, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING token, user_id, user_name, created_at, expires_at
            "#,
        )
        .bind(token)
        .bind(user.id)
        .bind(&user.name)
        .bind(OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes))
        .fetch_one(db)
        .await?;
        Ok(session)
    }

    /// Resolve a token to its bound identity. Pure lookup, no side effect.
    /// Expired rows never resolve even before the sweeper removes them.
    pub async fn resolve(db: &PgPool, token: Uuid) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, user_name, created_at, expires_at
            FROM sessions
            WHERE token = $1 AND expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(session)
    }

    /// Destroy a session. Callers await this before sending the redirect so
    /// the client is never released while the server-side row still exists.
    pub async fn destroy(db: &PgPool, token: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM sessions WHERE token = $1"#)
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Remove expired rows. Driven by a background interval task.
    pub async fn purge_expired(db: &PgPool) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM sessions WHERE expires_at <= now()"#)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.user_id,
            name: self.user_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_copies_identity() {
        let session = Session {
            token: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_name: "alice".into(),
            created_at: OffsetDateTime::now_utc(),
            expires_at: OffsetDateTime::now_utc() + Duration::minutes(5),
        };
        let snap = session.snapshot();
        assert_eq!(snap.id, session.user_id);
        assert_eq!(snap.name, "alice");
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        // Token generation is plain v4; two issues must never collide.
        assert_ne!(Uuid::new_v4(), Uuid::new_v4());
    }
}
