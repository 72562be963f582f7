use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::handlers::{AppState, AuthUser};
use crate::services::FeedPage;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub cursor: Option<Uuid>,
    pub limit: Option<i64>,
}

/// GET /feed?cursor=&limit=
pub async fn next_feed_candidates(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedPage>, CoreError> {
    let page = state
        .feed
        .next_candidates(viewer, query.cursor, query.limit)
        .await?;
    Ok(Json(page))
}
