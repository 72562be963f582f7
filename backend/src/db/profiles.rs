use async_trait::async_trait;
use uuid::Uuid;

use crate::db::PgStore;
use crate::errors::{CoreError, CoreResult};
use crate::models::{ProfilePatch, UserProfile};
use crate::store::ProfileStore;

const PROFILE_COLUMNS: &str = "id, first_name, last_name, email, profile_asset_key, gender, age, \
                               about, skills, created_at, updated_at";

#[async_trait]
impl ProfileStore for PgStore {
    async fn insert_profile(&self, profile: UserProfile) -> CoreResult<UserProfile> {
        let sql = format!(
            "INSERT INTO user_profiles \
             (id, first_name, last_name, email, profile_asset_key, gender, age, about, skills) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {PROFILE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(profile.id)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.email)
            .bind(&profile.profile_asset_key)
            .bind(&profile.gender)
            .bind(profile.age)
            .bind(&profile.about)
            .bind(&profile.skills)
            .fetch_one(self.pool())
            .await?;

        Ok(inserted)
    }

    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<UserProfile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1");
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(profile)
    }

    async fn apply_patch(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> CoreResult<Option<UserProfile>> {
        // One conditional UPDATE keeps the partial patch atomic: unset fields
        // keep their stored value via COALESCE.
        let sql = format!(
            "UPDATE user_profiles SET \
               first_name = COALESCE($2, first_name), \
               last_name = COALESCE($3, last_name), \
               profile_asset_key = COALESCE($4, profile_asset_key), \
               gender = COALESCE($5, gender), \
               age = COALESCE($6, age), \
               about = COALESCE($7, about), \
               skills = COALESCE($8, skills), \
               updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(&patch.first_name)
            .bind(&patch.last_name)
            .bind(&patch.profile_asset_key)
            .bind(&patch.gender)
            .bind(patch.age)
            .bind(&patch.about)
            .bind(&patch.skills)
            .fetch_optional(self.pool())
            .await?;

        Ok(updated)
    }

    async fn list_candidates(
        &self,
        exclude: &[Uuid],
        after: Option<Uuid>,
        limit: i64,
    ) -> CoreResult<Vec<UserProfile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles \
             WHERE id <> ALL($1) AND ($2::uuid IS NULL OR id > $2) \
             ORDER BY id ASC \
             LIMIT $3"
        );
        let candidates = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(exclude.to_vec())
            .bind(after)
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(CoreError::from)?;

        Ok(candidates)
    }
}
