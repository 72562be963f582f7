use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::constants::{DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT};
use crate::errors::CoreResult;
use crate::models::UserProfile;
use crate::store::Store;

/// One page of feed candidates. `next_cursor` is the id of the last returned
/// profile; passing it back continues the sequence without skips or
/// duplicates within one exclusion-set snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub data: Vec<UserProfile>,
    pub next_cursor: Option<Uuid>,
}

/// Computes the profiles a viewer has not yet resolved. Every call
/// re-evaluates the exclusion set — the viewer itself plus everyone sharing a
/// request row with it, in either direction, in any status — so a candidate
/// requested moments ago never reappears on the next page. The exclusion set
/// only grows, which makes each candidate appear at most once over the
/// lifetime of the viewer's browsing.
#[derive(Clone)]
pub struct FeedGenerator {
    store: Arc<dyn Store>,
}

impl FeedGenerator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn next_candidates(
        &self,
        viewer_id: Uuid,
        cursor: Option<Uuid>,
        limit: Option<i64>,
    ) -> CoreResult<FeedPage> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT);

        let mut exclude = self.store.excluded_user_ids(viewer_id).await?;
        exclude.push(viewer_id);

        let data = self.store.list_candidates(&exclude, cursor, limit).await?;
        // A short page means the sequence is exhausted for this snapshot.
        let next_cursor = if (data.len() as i64) < limit {
            None
        } else {
            data.last().map(|p| p.id)
        };

        Ok(FeedPage { data, next_cursor })
    }
}
