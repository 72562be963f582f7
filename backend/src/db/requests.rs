use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::db::PgStore;
use crate::errors::CoreResult;
use crate::models::{ConnectionRequest, Direction, RequestStatus, UserProfile};
use crate::store::RequestStore;

const REQUEST_COLUMNS: &str = "id, from_user_id, to_user_id, status, created_at, decided_at";

#[async_trait]
impl RequestStore for PgStore {
    async fn insert_request(&self, request: ConnectionRequest) -> CoreResult<ConnectionRequest> {
        // The unique index on (LEAST(from, to), GREATEST(from, to)) is the
        // unordered-pair constraint; a violation surfaces as Conflict.
        let sql = format!(
            "INSERT INTO connection_requests (id, from_user_id, to_user_id, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {REQUEST_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(request.id)
            .bind(request.from_user_id)
            .bind(request.to_user_id)
            .bind(request.status)
            .fetch_one(self.pool())
            .await?;

        Ok(inserted)
    }

    async fn get_request(&self, id: Uuid) -> CoreResult<Option<ConnectionRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM connection_requests WHERE id = $1");
        let request = sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(request)
    }

    async fn decide_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        decided_at: DateTime<Utc>,
    ) -> CoreResult<Option<ConnectionRequest>> {
        // Compare-and-swap: only a pending row can transition, so of any
        // number of racing deciders exactly one sees a returned row.
        let sql = format!(
            "UPDATE connection_requests \
             SET status = $2, decided_at = $3 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(id)
            .bind(status)
            .bind(decided_at)
            .fetch_optional(self.pool())
            .await?;

        Ok(updated)
    }

    async fn list_requests(
        &self,
        user_id: Uuid,
        direction: Direction,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<ConnectionRequest>> {
        let side = match direction {
            Direction::Sent => "from_user_id",
            Direction::Received => "to_user_id",
        };
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM connection_requests \
             WHERE {side} = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        );
        let requests = sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(user_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(self.pool())
            .await?;

        Ok(requests)
    }

    async fn received_with_senders(
        &self,
        user_id: Uuid,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<(ConnectionRequest, UserProfile)>> {
        let rows = sqlx::query(
            "SELECT \
                r.id AS r_id, r.from_user_id, r.to_user_id, r.status AS r_status, \
                r.created_at AS r_created_at, r.decided_at, \
                p.id AS p_id, p.first_name, p.last_name, p.email, p.profile_asset_key, \
                p.gender, p.age, p.about, p.skills, \
                p.created_at AS p_created_at, p.updated_at \
             FROM connection_requests r \
             JOIN user_profiles p ON p.id = r.from_user_id \
             WHERE r.to_user_id = $1 AND ($2::text IS NULL OR r.status = $2) \
             ORDER BY r.created_at DESC",
        )
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool())
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let request = ConnectionRequest {
                id: row.try_get("r_id")?,
                from_user_id: row.try_get("from_user_id")?,
                to_user_id: row.try_get("to_user_id")?,
                status: row.try_get("r_status")?,
                created_at: row.try_get("r_created_at")?,
                decided_at: row.try_get("decided_at")?,
            };
            let sender = UserProfile {
                id: row.try_get("p_id")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                email: row.try_get("email")?,
                profile_asset_key: row.try_get("profile_asset_key")?,
                gender: row.try_get("gender")?,
                age: row.try_get("age")?,
                about: row.try_get("about")?,
                skills: row.try_get("skills")?,
                created_at: row.try_get("p_created_at")?,
                updated_at: row.try_get("updated_at")?,
            };
            result.push((request, sender));
        }

        Ok(result)
    }

    async fn excluded_user_ids(&self, viewer_id: Uuid) -> CoreResult<Vec<Uuid>> {
        let peers = sqlx::query_scalar::<_, Uuid>(
            "SELECT CASE WHEN from_user_id = $1 THEN to_user_id ELSE from_user_id END \
             FROM connection_requests \
             WHERE from_user_id = $1 OR to_user_id = $1",
        )
        .bind(viewer_id)
        .fetch_all(self.pool())
        .await?;

        Ok(peers)
    }

    async fn connected_profiles(&self, user_id: Uuid) -> CoreResult<Vec<UserProfile>> {
        let profiles = sqlx::query_as::<_, UserProfile>(
            "SELECT p.id, p.first_name, p.last_name, p.email, p.profile_asset_key, \
                    p.gender, p.age, p.about, p.skills, p.created_at, p.updated_at \
             FROM connection_requests r \
             JOIN user_profiles p \
               ON p.id = CASE WHEN r.from_user_id = $1 THEN r.to_user_id ELSE r.from_user_id END \
             WHERE (r.from_user_id = $1 OR r.to_user_id = $1) AND r.status = 'accepted' \
             ORDER BY r.decided_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(profiles)
    }
}
