use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};
use crate::models::{NewProfile, ProfilePatch, UserProfile};
use crate::store::Store;
use crate::utils::validate;

/// Validated access to profile records. Creation happens once, when the
/// external registration flow provisions the record; afterwards the profile
/// mutates only through validated partial patches, applied atomically.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn Store>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, user_id: Uuid) -> CoreResult<UserProfile> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or(CoreError::NotFound)
    }

    /// Provisions a profile record. Email is fixed here for good.
    pub async fn create(&self, new: NewProfile) -> CoreResult<UserProfile> {
        validate::validate_new_profile(&new)?;
        let skills = validate::normalize_skills(new.skills)?;
        let now = Utc::now();
        let profile = UserProfile {
            id: Uuid::new_v4(),
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            email: new.email.trim().to_lowercase(),
            profile_asset_key: None,
            gender: new.gender,
            age: new.age,
            about: new.about,
            skills,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_profile(profile).await
    }

    /// Applies a partial update. The asset reference, when present, must name
    /// a completed upload owned by the caller — arbitrary external URLs are
    /// not accepted as profile assets.
    pub async fn patch(&self, user_id: Uuid, mut patch: ProfilePatch) -> CoreResult<UserProfile> {
        if patch.is_empty() {
            return Err(CoreError::validation("body", "no fields to update"));
        }
        validate::validate_patch(&patch)?;
        if let Some(skills) = patch.skills.take() {
            patch.skills = Some(validate::normalize_skills(skills)?);
        }
        if let Some(key) = &patch.profile_asset_key {
            match self.store.get_session_by_key(key).await? {
                Some(session) if session.owner_user_id == user_id && session.consumed => {}
                _ => {
                    return Err(CoreError::validation(
                        "profileAssetKey",
                        "must reference a completed upload owned by the caller",
                    ));
                }
            }
        }

        self.store
            .apply_patch(user_id, &patch)
            .await?
            .ok_or(CoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadSession;
    use crate::store::{MemoryStore, SessionStore};
    use chrono::Duration;

    fn new_profile(email: &str) -> NewProfile {
        NewProfile {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            gender: Some("female".to_string()),
            age: Some(28),
            about: Some("mathematician".to_string()),
            skills: vec!["analysis".to_string()],
        }
    }

    fn service() -> (ProfileService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ProfileService::new(store.clone()), store)
    }

    fn patch_with(f: impl FnOnce(&mut ProfilePatch)) -> ProfilePatch {
        let mut patch = ProfilePatch::default();
        f(&mut patch);
        patch
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (profiles, _) = service();
        let created = profiles.create(new_profile("ada@example.com")).await.unwrap();
        let fetched = profiles.get(created.id).await.unwrap();
        assert_eq!(fetched.email, "ada@example.com");
        assert_eq!(fetched.skills, vec!["analysis"]);
    }

    #[tokio::test]
    async fn underage_patch_is_a_validation_error() {
        let (profiles, _) = service();
        let user = profiles.create(new_profile("a@example.com")).await.unwrap();

        let err = profiles
            .patch(user.id, patch_with(|p| p.age = Some(15)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { field: "age", .. }));

        // Failed patch left the record untouched.
        assert_eq!(profiles.get(user.id).await.unwrap().age, Some(28));
    }

    #[tokio::test]
    async fn short_name_patch_is_a_validation_error() {
        let (profiles, _) = service();
        let user = profiles.create(new_profile("a@example.com")).await.unwrap();
        let err = profiles
            .patch(user.id, patch_with(|p| p.first_name = Some("A".into())))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation { field: "firstName", .. }
        ));
    }

    #[tokio::test]
    async fn skills_are_canonicalized_on_patch() {
        let (profiles, _) = service();
        let user = profiles.create(new_profile("a@example.com")).await.unwrap();

        let updated = profiles
            .patch(
                user.id,
                patch_with(|p| {
                    p.skills = Some(vec![" rust ".into(), "sql".into(), "rust".into()])
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.skills, vec!["rust", "sql"]);
    }

    #[tokio::test]
    async fn asset_key_must_be_a_consumed_owned_upload() {
        let (profiles, store) = service();
        let owner = profiles.create(new_profile("a@example.com")).await.unwrap();
        let other = profiles.create(new_profile("b@example.com")).await.unwrap();

        let now = Utc::now();
        store
            .insert_session(UploadSession {
                id: Uuid::new_v4(),
                owner_user_id: owner.id,
                storage_key: "profiles/owner/pic.png".to_string(),
                upload_token: "tok".to_string(),
                issued_at: now,
                expires_at: now + Duration::minutes(15),
                consumed: false,
            })
            .await
            .unwrap();

        let unconsumed = profiles
            .patch(
                owner.id,
                patch_with(|p| p.profile_asset_key = Some("profiles/owner/pic.png".into())),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            unconsumed,
            CoreError::Validation { field: "profileAssetKey", .. }
        ));

        store
            .consume_session("profiles/owner/pic.png", now)
            .await
            .unwrap();

        // Someone else's upload is still not a valid reference.
        let foreign = profiles
            .patch(
                other.id,
                patch_with(|p| p.profile_asset_key = Some("profiles/owner/pic.png".into())),
            )
            .await
            .unwrap_err();
        assert!(matches!(foreign, CoreError::Validation { .. }));

        let updated = profiles
            .patch(
                owner.id,
                patch_with(|p| {
                    p.profile_asset_key = Some("profiles/owner/pic.png".into());
                    p.about = Some("updated together".into());
                }),
            )
            .await
            .unwrap();
        assert_eq!(
            updated.profile_asset_key.as_deref(),
            Some("profiles/owner/pic.png")
        );
        assert_eq!(updated.about.as_deref(), Some("updated together"));
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let (profiles, _) = service();
        let user = profiles.create(new_profile("a@example.com")).await.unwrap();
        let err = profiles
            .patch(user.id, ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { field: "body", .. }));
    }

    #[tokio::test]
    async fn bad_email_at_creation_is_rejected() {
        let (profiles, _) = service();
        let err = profiles
            .create(new_profile("not-an-address"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { field: "email", .. }));
    }
}
