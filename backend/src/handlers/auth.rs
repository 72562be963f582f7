use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};
use serde_json::{Value, json};
use uuid::Uuid;

/// Trusted acting-user identity. Credential validation happens upstream in
/// the auth layer, which forwards the resolved user id in `x-user-id`; this
/// extractor only refuses calls that arrive without one.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(AuthUser)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "missing or invalid x-user-id header" })),
            ))
    }
}
