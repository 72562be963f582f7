use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};
use crate::models::{ConnectionRequest, Direction, ReceivedRequest, RequestStatus, UserProfile};
use crate::store::Store;

/// Connection-request ledger. Requests are directed edges with at most one
/// row per unordered user pair; rows are never deleted, and a decided row is
/// terminal. Duplicate detection rides on the store's pair index.
#[derive(Clone)]
pub struct ConnectionLedger {
    store: Arc<dyn Store>,
}

impl ConnectionLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Opens a pending request from one user to another.
    pub async fn create(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
    ) -> CoreResult<ConnectionRequest> {
        if from_user_id == to_user_id {
            return Err(CoreError::SelfRequest);
        }
        if self.store.get_profile(to_user_id).await?.is_none() {
            return Err(CoreError::NotFound);
        }
        let request = self
            .store
            .insert_request(ConnectionRequest::pending(from_user_id, to_user_id))
            .await?;
        tracing::info!(
            request_id = %request.id,
            from = %from_user_id,
            to = %to_user_id,
            "connection request created"
        );
        Ok(request)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<ConnectionRequest> {
        self.store
            .get_request(id)
            .await?
            .ok_or(CoreError::NotFound)
    }

    /// Requests touching a user on one side, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        direction: Direction,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<ConnectionRequest>> {
        self.store.list_requests(user_id, direction, status).await
    }

    /// Received requests with each sender's profile, for the requests page.
    pub async fn received_requests(
        &self,
        user_id: Uuid,
        status: Option<RequestStatus>,
    ) -> CoreResult<Vec<ReceivedRequest>> {
        let rows = self.store.received_with_senders(user_id, status).await?;
        Ok(rows
            .into_iter()
            .map(|(request, sender)| ReceivedRequest::new(request, sender))
            .collect())
    }

    /// Peer profiles connected to the user. Connections are derived from
    /// accepted requests; there is no separate connection record.
    pub async fn connections(&self, user_id: Uuid) -> CoreResult<Vec<UserProfile>> {
        self.store.connected_profiles(user_id).await
    }
}
