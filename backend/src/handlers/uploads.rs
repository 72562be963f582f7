use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::errors::CoreError;
use crate::handlers::{AppState, AuthUser};
use crate::models::{DownloadTarget, UploadTarget};

#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct ObjectKeyRequest {
    pub key: String,
}

/// POST /get-upload-url
pub async fn get_upload_url(
    State(state): State<AppState>,
    AuthUser(acting_user): AuthUser,
    Json(req): Json<UploadUrlRequest>,
) -> Result<Json<UploadTarget>, CoreError> {
    let target = state
        .uploads
        .issue_upload_target(acting_user, &req.filename)
        .await?;
    Ok(Json(target))
}

/// POST /uploads/confirm — explicit completion signal for an upload grant.
pub async fn confirm_upload(
    State(state): State<AppState>,
    AuthUser(_acting_user): AuthUser,
    Json(req): Json<ObjectKeyRequest>,
) -> Result<StatusCode, CoreError> {
    state.uploads.confirm_upload(&req.key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /get-download-url
pub async fn get_download_url(
    State(state): State<AppState>,
    AuthUser(_acting_user): AuthUser,
    Json(req): Json<ObjectKeyRequest>,
) -> Result<Json<DownloadTarget>, CoreError> {
    let target = state.uploads.issue_download_target(&req.key).await?;
    Ok(Json(target))
}
