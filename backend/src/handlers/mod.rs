pub mod auth;
pub mod feed;
pub mod profiles;
pub mod requests;
pub mod uploads;

use std::sync::Arc;

use crate::services::{
    ConnectionLedger, FeedGenerator, ProfileService, RequestLifecycle, UploadCoordinator,
};
use crate::store::Store;
use crate::utils::Config;

pub use auth::AuthUser;
pub use feed::next_feed_candidates;
pub use profiles::{edit_profile, view_profile};
pub use requests::{list_connections, list_received_requests, review_request, send_request};
pub use uploads::{confirm_upload, get_download_url, get_upload_url};

/// Shared handler state: one store handle fanned out to the services.
#[derive(Clone)]
pub struct AppState {
    pub ledger: ConnectionLedger,
    pub lifecycle: RequestLifecycle,
    pub feed: FeedGenerator,
    pub profiles: ProfileService,
    pub uploads: UploadCoordinator,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            ledger: ConnectionLedger::new(store.clone()),
            lifecycle: RequestLifecycle::new(store.clone()),
            feed: FeedGenerator::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            uploads: UploadCoordinator::new(
                store,
                config.object_store_url.clone(),
                config.upload_ttl_minutes,
            ),
        }
    }
}

/// The full route table. CORS and other outer layers are attached by the
/// server binary.
pub fn router(state: AppState) -> axum::Router {
    use axum::routing::{get, patch, post};

    axum::Router::new()
        .route("/health", get(health_check))
        // Connection requests
        .route("/request/send/{to_user_id}", post(send_request))
        .route("/request/review/{outcome}/{request_id}", post(review_request))
        .route("/user/requests/received", get(list_received_requests))
        .route("/user/connections", get(list_connections))
        // Feed
        .route("/feed", get(next_feed_candidates))
        // Profile
        .route("/profile/view", get(view_profile))
        .route("/profile/edit", patch(edit_profile))
        // Uploads
        .route("/get-upload-url", post(get_upload_url))
        .route("/get-download-url", post(get_download_url))
        .route("/uploads/confirm", post(confirm_upload))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewProfile, UserProfile};
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_config() -> Config {
        Config {
            port: 0,
            object_store_url: "https://objects.example.com".to_string(),
            upload_ttl_minutes: 15,
        }
    }

    async fn app_with_users(n: u32) -> (axum::Router, AppState, Vec<Uuid>) {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(store, &test_config());
        let mut ids = Vec::new();
        for i in 0..n {
            let profile = state
                .profiles
                .create(NewProfile {
                    first_name: format!("User{i}"),
                    last_name: "Tester".to_string(),
                    email: format!("user{i}@example.com"),
                    gender: None,
                    age: Some(30),
                    about: None,
                    skills: vec![],
                })
                .await
                .unwrap();
            ids.push(profile.id);
        }
        (router(state.clone()), state, ids)
    }

    fn authed(method: &str, uri: &str, user: Uuid, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", user.to_string());
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_identity_header_is_unauthorized() {
        let (app, _, _) = app_with_users(1).await;
        let response = app
            .oneshot(Request::get("/feed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn send_review_and_list_connections_end_to_end() {
        let (app, _, ids) = app_with_users(2).await;
        let (a, b) = (ids[0], ids[1]);

        let created = app
            .clone()
            .oneshot(authed("POST", &format!("/request/send/{b}"), a, None))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let request: Value = json_body(created).await;
        assert_eq!(request["status"], "pending");
        let request_id = request["id"].as_str().unwrap().to_string();

        // Duplicate attempt conflicts.
        let duplicate = app
            .clone()
            .oneshot(authed("POST", &format!("/request/send/{b}"), a, None))
            .await
            .unwrap();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        // The receiver sees the request, with the sender profile attached.
        let received = app
            .clone()
            .oneshot(authed("GET", "/user/requests/received?status=pending", b, None))
            .await
            .unwrap();
        let rows = json_body(received).await;
        assert_eq!(rows[0]["fromUser"]["firstName"], "User0");

        let reviewed = app
            .clone()
            .oneshot(authed(
                "POST",
                &format!("/request/review/accepted/{request_id}"),
                b,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(reviewed.status(), StatusCode::OK);

        let again = app
            .clone()
            .oneshot(authed(
                "POST",
                &format!("/request/review/rejected/{request_id}"),
                b,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::CONFLICT);

        let connections = app
            .clone()
            .oneshot(authed("GET", "/user/connections", a, None))
            .await
            .unwrap();
        let peers = json_body(connections).await;
        assert_eq!(peers.as_array().unwrap().len(), 1);
        assert_eq!(peers[0]["id"], b.to_string());
    }

    #[tokio::test]
    async fn self_request_is_a_bad_request() {
        let (app, _, ids) = app_with_users(1).await;
        let response = app
            .oneshot(authed(
                "POST",
                &format!("/request/send/{}", ids[0]),
                ids[0],
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn feed_excludes_viewer_and_paginates() {
        let (app, _, ids) = app_with_users(3).await;
        let response = app
            .clone()
            .oneshot(authed("GET", "/feed?limit=1", ids[0], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["data"].as_array().unwrap().len(), 1);
        assert!(page["nextCursor"].is_string());
        assert_ne!(page["data"][0]["id"], ids[0].to_string());
    }

    #[tokio::test]
    async fn upload_flow_feeds_the_profile_patch() {
        let (app, _, ids) = app_with_users(1).await;
        let user = ids[0];

        let issued = app
            .clone()
            .oneshot(authed(
                "POST",
                "/get-upload-url",
                user,
                Some(serde_json::json!({ "filename": "pic.png" })),
            ))
            .await
            .unwrap();
        assert_eq!(issued.status(), StatusCode::OK);
        let target = json_body(issued).await;
        let key = target["key"].as_str().unwrap().to_string();
        assert!(target["uploadUrl"].as_str().unwrap().contains(&key));

        // Bytes go straight to the object store; the first download request
        // doubles as the completion signal.
        let download = app
            .clone()
            .oneshot(authed(
                "POST",
                "/get-download-url",
                user,
                Some(serde_json::json!({ "key": key })),
            ))
            .await
            .unwrap();
        assert_eq!(download.status(), StatusCode::OK);
        assert!(
            json_body(download).await["downloadUrl"]
                .as_str()
                .unwrap()
                .ends_with(&key)
        );

        let patched = app
            .clone()
            .oneshot(authed(
                "PATCH",
                "/profile/edit",
                user,
                Some(serde_json::json!({ "profileAssetKey": key, "about": "new photo" })),
            ))
            .await
            .unwrap();
        assert_eq!(patched.status(), StatusCode::OK);
        let profile = json_body(patched).await;
        assert_eq!(profile["profileAssetKey"], key);
        assert_eq!(profile["about"], "new photo");
    }

    #[tokio::test]
    async fn invalid_age_patch_reports_the_field() {
        let (app, _, ids) = app_with_users(1).await;
        let response = app
            .oneshot(authed(
                "PATCH",
                "/profile/edit",
                ids[0],
                Some(serde_json::json!({ "age": 15 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["field"], "age");
    }

    #[tokio::test]
    async fn profile_responses_share_one_shape() {
        let (app, _, ids) = app_with_users(1).await;
        let response = app
            .oneshot(authed("GET", "/profile/view", ids[0], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let profile: UserProfile = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(profile.id, ids[0]);
    }
}
