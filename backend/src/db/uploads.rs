use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::PgStore;
use crate::errors::CoreResult;
use crate::models::UploadSession;
use crate::store::SessionStore;

const SESSION_COLUMNS: &str =
    "id, owner_user_id, storage_key, upload_token, issued_at, expires_at, consumed";

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(&self, session: UploadSession) -> CoreResult<UploadSession> {
        let sql = format!(
            "INSERT INTO upload_sessions \
             (id, owner_user_id, storage_key, upload_token, issued_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {SESSION_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, UploadSession>(&sql)
            .bind(session.id)
            .bind(session.owner_user_id)
            .bind(&session.storage_key)
            .bind(&session.upload_token)
            .bind(session.issued_at)
            .bind(session.expires_at)
            .fetch_one(self.pool())
            .await?;

        Ok(inserted)
    }

    async fn get_session_by_key(&self, storage_key: &str) -> CoreResult<Option<UploadSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM upload_sessions WHERE storage_key = $1");
        let session = sqlx::query_as::<_, UploadSession>(&sql)
            .bind(storage_key)
            .fetch_optional(self.pool())
            .await?;

        Ok(session)
    }

    async fn consume_session(&self, storage_key: &str, now: DateTime<Utc>) -> CoreResult<bool> {
        // Single-writer transition: the conditional UPDATE flips `consumed`
        // at most once per session, and never after expiry.
        let result = sqlx::query(
            "UPDATE upload_sessions \
             SET consumed = TRUE \
             WHERE storage_key = $1 AND consumed = FALSE AND expires_at > $2",
        )
        .bind(storage_key)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
