pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreResult;
use crate::models::{
    ConnectionRequest, Direction, ProfilePatch, RequestStatus, UploadSession, UserProfile,
};

pub use memory::MemoryStore;

/// Persistence seam for profile records. Mutations are single atomic
/// operations against the backing store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Inserts a new profile. Fails `Conflict` on a duplicate email.
    async fn insert_profile(&self, profile: UserProfile) -> CoreResult<UserProfile>;

    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<UserProfile>>;

    /// Applies a partial update in one atomic write. `None` fields keep their
    /// current value. Returns `None` if the profile does not exist.
    async fn apply_patch(&self, id: Uuid, patch: &ProfilePatch)
    -> CoreResult<Option<UserProfile>>;

    /// Page of candidate profiles ordered by ascending id, excluding the
    /// given ids, starting strictly after the cursor.
    async fn list_candidates(
        &self,
        exclude: &[Uuid],
        after: Option<Uuid>,
        limit: i64,
    ) -> CoreResult<Vec<UserProfile>>;
}

/// Persistence seam for the connection-request ledger. The unordered-pair
/// uniqueness constraint and the pending-to-terminal transition both live
/// here, enforced atomically by the backing store.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Inserts a pending request. Fails `Conflict` if any request, in any
    /// status, already exists between the same unordered pair.
    async fn insert_request(&self, request: ConnectionRequest) -> CoreResult<ConnectionRequest>;

    async fn get_request(&self, id: Uuid) -> CoreResult<Option<ConnectionRequest>>;

    /// Compare-and-swap from `pending` to the given terminal status. Returns
    /// `None` when the request was not pending (the caller lost the race or
    /// the request was already decided).
    async fn decide_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        decided_at: DateTime<Utc>,
    ) -> CoreResult<Option<ConnectionRequest>>;

    /// Requests touching the user on the given side, newest first.
    async fn list_requests(
        &self,
        user_id: Uuid,
        direction: Direction,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<ConnectionRequest>>;

    /// Received requests joined with each sender's profile, newest first.
    async fn received_with_senders(
        &self,
        user_id: Uuid,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<(ConnectionRequest, UserProfile)>>;

    /// Every peer that shares a request row with the user, in either
    /// direction, regardless of status. This is the feed exclusion set
    /// (minus the user itself).
    async fn excluded_user_ids(&self, viewer_id: Uuid) -> CoreResult<Vec<Uuid>>;

    /// Profiles of peers connected to the user via accepted requests, most
    /// recently decided first.
    async fn connected_profiles(&self, user_id: Uuid) -> CoreResult<Vec<UserProfile>>;
}

/// Persistence seam for upload sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: UploadSession) -> CoreResult<UploadSession>;

    async fn get_session_by_key(&self, storage_key: &str) -> CoreResult<Option<UploadSession>>;

    /// Single-writer compare-and-swap on `consumed`. Returns `true` iff this
    /// call flipped the flag before expiry; `false` if the session was
    /// already consumed or has expired.
    async fn consume_session(&self, storage_key: &str, now: DateTime<Utc>) -> CoreResult<bool>;
}

/// Blanket supertrait so services and handlers can hold a single store handle.
pub trait Store: ProfileStore + RequestStore + SessionStore {}

impl<T: ProfileStore + RequestStore + SessionStore> Store for T {}
