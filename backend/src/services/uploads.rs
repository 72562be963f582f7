use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{Rng, distr::Alphanumeric};
use uuid::Uuid;

use crate::constants::UPLOAD_TOKEN_LENGTH;
use crate::errors::{CoreError, CoreResult};
use crate::models::{DownloadTarget, UploadSession, UploadTarget};
use crate::store::Store;

/// Issues and invalidates credentials for direct-to-storage transfers. The
/// bytes themselves never pass through here: the client PUTs against the
/// issued URL and the external object store owns the object.
#[derive(Clone)]
pub struct UploadCoordinator {
    store: Arc<dyn Store>,
    base_url: String,
    ttl: Duration,
}

impl UploadCoordinator {
    pub fn new(store: Arc<dyn Store>, base_url: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            store,
            base_url: base_url.into(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Issues a TTL-bound, single-use upload grant for one object.
    pub async fn issue_upload_target(
        &self,
        owner_user_id: Uuid,
        filename: &str,
    ) -> CoreResult<UploadTarget> {
        let safe_name = sanitize_filename(filename);
        if safe_name.is_empty() {
            return Err(CoreError::validation("filename", "no usable characters"));
        }

        let now = Utc::now();
        let session = UploadSession {
            id: Uuid::new_v4(),
            owner_user_id,
            storage_key: format!("profiles/{owner_user_id}/{}-{safe_name}", Uuid::new_v4()),
            upload_token: random_token(UPLOAD_TOKEN_LENGTH),
            issued_at: now,
            expires_at: now + self.ttl,
            consumed: false,
        };
        let session = self.store.insert_session(session).await?;

        tracing::debug!(key = %session.storage_key, owner = %owner_user_id, "upload grant issued");
        Ok(UploadTarget {
            upload_url: format!(
                "{}/{}?token={}",
                self.base_url, session.storage_key, session.upload_token
            ),
            key: session.storage_key,
        })
    }

    /// Explicit completion signal. The consume flag flips exactly once; a
    /// second confirmation, or one arriving after the TTL, fails.
    pub async fn confirm_upload(&self, key: &str) -> CoreResult<()> {
        if self.store.get_session_by_key(key).await?.is_none() {
            return Err(CoreError::NotFound);
        }
        if self.store.consume_session(key, Utc::now()).await? {
            Ok(())
        } else {
            Err(CoreError::SessionExpired)
        }
    }

    /// Issues a retrieval reference for an uploaded object. The first call
    /// for a still-pending session doubles as the completion signal; once the
    /// upload is consumed, reads repeat freely. A session whose grant lapsed
    /// without an upload is gone for good.
    pub async fn issue_download_target(&self, key: &str) -> CoreResult<DownloadTarget> {
        let session = self
            .store
            .get_session_by_key(key)
            .await?
            .ok_or(CoreError::NotFound)?;

        if !session.consumed && !self.store.consume_session(key, Utc::now()).await? {
            return Err(CoreError::SessionExpired);
        }

        Ok(DownloadTarget {
            download_url: format!("{}/{}", self.base_url, session.storage_key),
        })
    }
}

/// Keeps alphanumerics, dots, dashes and underscores; everything else becomes
/// an underscore. Path separators never survive into a storage key.
fn sanitize_filename(filename: &str) -> String {
    filename
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .skip_while(|c| *c == '_' || *c == '.')
        .take(128)
        .collect()
}

fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
