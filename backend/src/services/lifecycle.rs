use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};
use crate::models::{ConnectionRequest, Outcome, RequestStatus};
use crate::store::Store;

/// Drives the single state transition a request ever makes:
/// `pending -> accepted | rejected`, fired exactly once, by the receiver.
/// Acceptance is what materializes a connection; there is no extra write.
#[derive(Clone)]
pub struct RequestLifecycle {
    store: Arc<dyn Store>,
}

impl RequestLifecycle {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn decide(
        &self,
        request_id: Uuid,
        acting_user_id: Uuid,
        outcome: Outcome,
    ) -> CoreResult<ConnectionRequest> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or(CoreError::NotFound)?;

        if request.to_user_id != acting_user_id {
            return Err(CoreError::Unauthorized);
        }
        if request.status != RequestStatus::Pending {
            return Err(CoreError::AlreadyDecided);
        }

        // The store-level compare-and-swap is what makes this exactly-once:
        // of any concurrent deciders, one gets the row back, the rest get
        // nothing and report AlreadyDecided.
        let decided = self
            .store
            .decide_request(request_id, outcome.into(), Utc::now())
            .await?
            .ok_or(CoreError::AlreadyDecided)?;

        tracing::info!(
            request_id = %decided.id,
            status = decided.status.as_str(),
            "connection request decided"
        );
        Ok(decided)
    }
}
