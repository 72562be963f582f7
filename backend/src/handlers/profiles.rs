use axum::Json;
use axum::extract::State;

use crate::errors::CoreError;
use crate::handlers::{AppState, AuthUser};
use crate::models::{ProfilePatch, UserProfile};

/// GET /profile/view
pub async fn view_profile(
    State(state): State<AppState>,
    AuthUser(acting_user): AuthUser,
) -> Result<Json<UserProfile>, CoreError> {
    let profile = state.profiles.get(acting_user).await?;
    Ok(Json(profile))
}

/// PATCH /profile/edit
pub async fn edit_profile(
    State(state): State<AppState>,
    AuthUser(acting_user): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, CoreError> {
    let updated = state.profiles.patch(acting_user, patch).await?;
    Ok(Json(updated))
}
