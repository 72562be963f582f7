use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::handlers::{AppState, AuthUser};
use crate::models::{ConnectionRequest, Outcome, ReceivedRequest, RequestStatus, UserProfile};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<RequestStatus>,
}

/// POST /request/send/{toUserId}
pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(acting_user): AuthUser,
    Path(to_user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ConnectionRequest>), CoreError> {
    let request = state.ledger.create(acting_user, to_user_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /request/review/{outcome}/{requestId}
pub async fn review_request(
    State(state): State<AppState>,
    AuthUser(acting_user): AuthUser,
    Path((outcome, request_id)): Path<(Outcome, Uuid)>,
) -> Result<Json<ConnectionRequest>, CoreError> {
    let decided = state
        .lifecycle
        .decide(request_id, acting_user, outcome)
        .await?;
    Ok(Json(decided))
}

/// GET /user/requests/received?status=
pub async fn list_received_requests(
    State(state): State<AppState>,
    AuthUser(acting_user): AuthUser,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<ReceivedRequest>>, CoreError> {
    let requests = state
        .ledger
        .received_requests(acting_user, query.status)
        .await?;
    Ok(Json(requests))
}

/// GET /user/connections
pub async fn list_connections(
    State(state): State<AppState>,
    AuthUser(acting_user): AuthUser,
) -> Result<Json<Vec<UserProfile>>, CoreError> {
    let peers = state.ledger.connections(acting_user).await?;
    Ok(Json(peers))
}
