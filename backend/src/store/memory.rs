use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};
use crate::models::{
    ConnectionRequest, Direction, ProfilePatch, RequestStatus, UploadSession, UserProfile,
};
use crate::store::{ProfileStore, RequestStore, SessionStore};

/// In-memory store. A single write lock makes every mutation atomic, which
/// gives the same uniqueness and compare-and-swap guarantees the Postgres
/// store gets from its indexes and conditional updates. Used by the test
/// suite and for running the server without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    // BTreeMap keeps candidate iteration in stable ascending-id order.
    profiles: BTreeMap<Uuid, UserProfile>,
    requests: HashMap<Uuid, ConnectionRequest>,
    // Canonical (min, max) pair key -> request id. The unordered-pair index.
    pairs: HashMap<(Uuid, Uuid), Uuid>,
    sessions: HashMap<String, UploadSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn insert_profile(&self, profile: UserProfile) -> CoreResult<UserProfile> {
        let mut inner = self.inner.write().await;
        if inner.profiles.values().any(|p| p.email == profile.email) {
            return Err(CoreError::Conflict);
        }
        inner.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<UserProfile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.get(&id).cloned())
    }

    async fn apply_patch(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> CoreResult<Option<UserProfile>> {
        let mut inner = self.inner.write().await;
        let Some(profile) = inner.profiles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(first_name) = &patch.first_name {
            profile.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            profile.last_name = last_name.clone();
        }
        if let Some(key) = &patch.profile_asset_key {
            profile.profile_asset_key = Some(key.clone());
        }
        if let Some(gender) = &patch.gender {
            profile.gender = Some(gender.clone());
        }
        if let Some(age) = patch.age {
            profile.age = Some(age);
        }
        if let Some(about) = &patch.about {
            profile.about = Some(about.clone());
        }
        if let Some(skills) = &patch.skills {
            profile.skills = skills.clone();
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn list_candidates(
        &self,
        exclude: &[Uuid],
        after: Option<Uuid>,
        limit: i64,
    ) -> CoreResult<Vec<UserProfile>> {
        let inner = self.inner.read().await;
        let candidates = inner
            .profiles
            .values()
            .filter(|p| match after {
                Some(cursor) => p.id > cursor,
                None => true,
            })
            .filter(|p| !exclude.contains(&p.id))
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(candidates)
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(&self, request: ConnectionRequest) -> CoreResult<ConnectionRequest> {
        let mut inner = self.inner.write().await;
        let key = ConnectionRequest::pair_key(request.from_user_id, request.to_user_id);
        if inner.pairs.contains_key(&key) {
            return Err(CoreError::Conflict);
        }
        inner.pairs.insert(key, request.id);
        inner.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_request(&self, id: Uuid) -> CoreResult<Option<ConnectionRequest>> {
        let inner = self.inner.read().await;
        Ok(inner.requests.get(&id).cloned())
    }

    async fn decide_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        decided_at: DateTime<Utc>,
    ) -> CoreResult<Option<ConnectionRequest>> {
        let mut inner = self.inner.write().await;
        let Some(request) = inner.requests.get_mut(&id) else {
            return Ok(None);
        };
        if request.status != RequestStatus::Pending {
            return Ok(None);
        }
        request.status = status;
        request.decided_at = Some(decided_at);
        Ok(Some(request.clone()))
    }

    async fn list_requests(
        &self,
        user_id: Uuid,
        direction: Direction,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<ConnectionRequest>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ConnectionRequest> = inner
            .requests
            .values()
            .filter(|r| match direction {
                Direction::Sent => r.from_user_id == user_id,
                Direction::Received => r.to_user_id == user_id,
            })
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn received_with_senders(
        &self,
        user_id: Uuid,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<(ConnectionRequest, UserProfile)>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<(ConnectionRequest, UserProfile)> = inner
            .requests
            .values()
            .filter(|r| r.to_user_id == user_id)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .filter_map(|r| {
                inner
                    .profiles
                    .get(&r.from_user_id)
                    .map(|p| (r.clone(), p.clone()))
            })
            .collect();
        rows.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        Ok(rows)
    }

    async fn excluded_user_ids(&self, viewer_id: Uuid) -> CoreResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        let peers = inner
            .requests
            .values()
            .filter_map(|r| {
                if r.from_user_id == viewer_id {
                    Some(r.to_user_id)
                } else if r.to_user_id == viewer_id {
                    Some(r.from_user_id)
                } else {
                    None
                }
            })
            .collect();
        Ok(peers)
    }

    async fn connected_profiles(&self, user_id: Uuid) -> CoreResult<Vec<UserProfile>> {
        let inner = self.inner.read().await;
        let mut accepted: Vec<&ConnectionRequest> = inner
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Accepted)
            .filter(|r| r.from_user_id == user_id || r.to_user_id == user_id)
            .collect();
        accepted.sort_by(|a, b| b.decided_at.cmp(&a.decided_at));
        let profiles = accepted
            .into_iter()
            .filter_map(|r| {
                let peer = if r.from_user_id == user_id {
                    r.to_user_id
                } else {
                    r.from_user_id
                };
                inner.profiles.get(&peer).cloned()
            })
            .collect();
        Ok(profiles)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: UploadSession) -> CoreResult<UploadSession> {
        let mut inner = self.inner.write().await;
        if inner.sessions.contains_key(&session.storage_key) {
            return Err(CoreError::Conflict);
        }
        inner
            .sessions
            .insert(session.storage_key.clone(), session.clone());
        Ok(session)
    }

    async fn get_session_by_key(&self, storage_key: &str) -> CoreResult<Option<UploadSession>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(storage_key).cloned())
    }

    async fn consume_session(&self, storage_key: &str, now: DateTime<Utc>) -> CoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(session) = inner.sessions.get_mut(storage_key) else {
            return Ok(false);
        };
        if session.consumed || session.is_expired(now) {
            return Ok(false);
        }
        session.consumed = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, email: &str) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            email: email.to_string(),
            profile_asset_key: None,
            gender: None,
            age: Some(30),
            about: None,
            skills: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn pair_index_rejects_the_reverse_direction_too() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store
            .insert_request(ConnectionRequest::pending(a, b))
            .await
            .unwrap();

        let err = store
            .insert_request(ConnectionRequest::pending(b, a))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict));
    }

    #[tokio::test]
    async fn decide_is_a_compare_and_swap() {
        let store = MemoryStore::new();
        let request = store
            .insert_request(ConnectionRequest::pending(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let now = Utc::now();
        let first = store
            .decide_request(request.id, RequestStatus::Accepted, now)
            .await
            .unwrap();
        let second = store
            .decide_request(request.id, RequestStatus::Rejected, now)
            .await
            .unwrap();

        assert_eq!(first.unwrap().status, RequestStatus::Accepted);
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn concurrent_decides_have_exactly_one_winner() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let request = store
            .insert_request(ConnectionRequest::pending(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let s1 = store.clone();
        let s2 = store.clone();
        let id = request.id;
        let (r1, r2) = tokio::join!(
            tokio::spawn(
                async move { s1.decide_request(id, RequestStatus::Accepted, Utc::now()).await }
            ),
            tokio::spawn(
                async move { s2.decide_request(id, RequestStatus::Rejected, Utc::now()).await }
            ),
        );
        let wins = [r1.unwrap().unwrap(), r2.unwrap().unwrap()]
            .iter()
            .filter(|r| r.is_some())
            .count();
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn candidates_page_in_ascending_id_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_profile(profile("User", &format!("user{i}@example.com")))
                .await
                .unwrap();
        }

        let first_page = store.list_candidates(&[], None, 3).await.unwrap();
        assert_eq!(first_page.len(), 3);
        let cursor = first_page.last().unwrap().id;
        let second_page = store.list_candidates(&[], Some(cursor), 3).await.unwrap();
        assert_eq!(second_page.len(), 2);
        assert!(second_page.iter().all(|p| p.id > cursor));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_profile(profile("Ada", "ada@example.com"))
            .await
            .unwrap();
        let err = store
            .insert_profile(profile("Ada2", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict));
    }
}
